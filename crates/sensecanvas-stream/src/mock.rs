//! Synthetic sensor data for development.
//!
//! Values follow slow sine waves over wall-clock time with bounded random
//! jitter on top, so consecutive samples look like a machine under a
//! drifting load. Percent fields are clamped to [0, 100].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sensecanvas_core::{
    now_ms, CoreData, CpuData, GpuData, MemoryData, MotherboardData, NetworkData, SensorData,
    StorageDevice,
};
use std::collections::BTreeMap;

const CORE_COUNT: u32 = 8;
const TOTAL_MEMORY_MB: f64 = 16_384.0;

/// GPU fan duty bounds in percent.
pub const GPU_FAN_RANGE: (f64, f64) = (30.0, 100.0);
/// GPU board power bounds in watts.
pub const GPU_POWER_RANGE: (f64, f64) = (50.0, 300.0);

fn percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Mock sensor generator.
pub struct MockGenerator {
    rng: StdRng,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic jitter, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform jitter in `[0, span)`.
    fn jitter(&mut self, span: f64) -> f64 {
        self.rng.random::<f64>() * span
    }

    /// Sample for the current time.
    pub fn sample(&mut self) -> SensorData {
        self.sample_at(now_ms())
    }

    /// Sample for a given wall-clock time (Unix ms).
    pub fn sample_at(&mut self, timestamp_ms: i64) -> SensorData {
        let t = timestamp_ms as f64;
        let cpu_load = 20.0 + (t / 10_000.0).sin() * 15.0 + self.jitter(10.0);
        let gpu_load = 30.0 + (t / 8_000.0).sin() * 20.0 + self.jitter(15.0);
        let memory_load = 45.0 + (t / 15_000.0).sin() * 10.0 + self.jitter(5.0);

        self.build(timestamp_ms, cpu_load, gpu_load, memory_load)
    }

    /// High-load sample, useful for exercising alert thresholds.
    pub fn stress_sample(&mut self) -> SensorData {
        let cpu_load = 85.0 + self.jitter(15.0);
        let gpu_load = 90.0 + self.jitter(10.0);
        let memory_load = 80.0 + self.jitter(15.0);

        let mut data = self.build(now_ms(), cpu_load, gpu_load, memory_load);
        data.cpu.temperature = 75.0 + self.jitter(15.0);
        data.gpu.temperature = 80.0 + self.jitter(10.0);
        data
    }

    fn build(
        &mut self,
        timestamp_ms: i64,
        cpu_load: f64,
        gpu_load: f64,
        memory_load: f64,
    ) -> SensorData {
        let cores = (0..CORE_COUNT)
            .map(|id| CoreData {
                id,
                usage: percent(cpu_load + (self.jitter(1.0) - 0.5) * 30.0),
                temperature: 35.0 + cpu_load * 0.8 + self.jitter(15.0),
            })
            .collect();

        let cpu = CpuData {
            usage: percent(cpu_load),
            temperature: 35.0 + cpu_load * 0.8 + self.jitter(10.0),
            frequency: 3.2 + self.jitter(0.8),
            voltage: 1.2 + self.jitter(0.1),
            cores,
        };

        let gpu = GpuData {
            usage: percent(gpu_load),
            temperature: 40.0 + gpu_load * 0.6 + self.jitter(15.0),
            memory: percent(gpu_load * 0.7 + self.jitter(20.0)),
            fan_speed: (gpu_load * 0.8 + self.jitter(20.0)).clamp(GPU_FAN_RANGE.0, GPU_FAN_RANGE.1),
            voltage: 1.1 + self.jitter(0.1),
            power_usage: (gpu_load * 2.5 + self.jitter(50.0))
                .clamp(GPU_POWER_RANGE.0, GPU_POWER_RANGE.1),
        };

        let memory_usage = percent(memory_load);
        let memory = MemoryData {
            usage: memory_usage,
            available: (TOTAL_MEMORY_MB * (100.0 - memory_usage) / 100.0).max(0.0),
            total: TOTAL_MEMORY_MB,
            speed: 3200.0 + self.jitter(400.0),
        };

        let storage = vec![
            StorageDevice {
                name: "NVMe SSD".to_string(),
                usage: percent(65.0 + self.jitter(10.0)),
                temperature: 35.0 + self.jitter(15.0),
                read_speed: 500.0 + self.jitter(200.0),
                write_speed: 400.0 + self.jitter(150.0),
            },
            StorageDevice {
                name: "HDD".to_string(),
                usage: percent(45.0 + self.jitter(10.0)),
                temperature: 30.0 + self.jitter(10.0),
                read_speed: 120.0 + self.jitter(30.0),
                write_speed: 100.0 + self.jitter(25.0),
            },
        ];

        let mut fans = BTreeMap::new();
        fans.insert("CPU Fan".to_string(), (1200.0 + self.jitter(400.0)).max(800.0));
        fans.insert("GPU Fan 1".to_string(), (1000.0 + self.jitter(600.0)).max(600.0));
        fans.insert("GPU Fan 2".to_string(), (1000.0 + self.jitter(600.0)).max(600.0));
        fans.insert("Case Fan 1".to_string(), (800.0 + self.jitter(200.0)).max(500.0));
        fans.insert("Case Fan 2".to_string(), (800.0 + self.jitter(200.0)).max(500.0));

        let mut voltages = BTreeMap::new();
        voltages.insert("CPU Core".to_string(), 1.2 + self.jitter(0.1));
        voltages.insert("12V Rail".to_string(), 11.9 + self.jitter(0.2));
        voltages.insert("5V Rail".to_string(), 4.95 + self.jitter(0.1));
        voltages.insert("3.3V Rail".to_string(), 3.28 + self.jitter(0.05));

        SensorData {
            cpu,
            gpu,
            memory,
            storage,
            fans,
            voltages,
            motherboard: MotherboardData {
                temperature: 32.0 + self.jitter(8.0),
                voltage: 3.3 + self.jitter(0.1),
            },
            network: NetworkData {
                bytes_received: self.jitter(1_000_000.0),
                bytes_sent: self.jitter(500_000.0),
                packets_received: self.jitter(1_000.0),
                packets_sent: self.jitter(800.0),
            },
            timestamp_ms,
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}
