//! Sensor telemetry types.
//!
//! `SensorData` is the flat snapshot every widget reads from. It is produced
//! wholesale on each update, either by mapping upstream `HardwareComponent`
//! records or by the mock generator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-core CPU reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreData {
    pub id: u32,
    pub usage: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuData {
    /// Load in percent.
    pub usage: f64,
    /// Package temperature in °C.
    pub temperature: f64,
    /// Clock in GHz.
    pub frequency: f64,
    pub voltage: f64,
    pub cores: Vec<CoreData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GpuData {
    pub usage: f64,
    pub temperature: f64,
    /// VRAM load in percent.
    pub memory: f64,
    pub fan_speed: f64,
    pub voltage: f64,
    /// Board power in watts.
    pub power_usage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryData {
    pub usage: f64,
    /// Available memory in MB.
    pub available: f64,
    /// Total memory in MB.
    pub total: f64,
    /// Memory clock in MHz.
    pub speed: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageDevice {
    pub name: String,
    pub usage: f64,
    pub temperature: f64,
    pub read_speed: f64,
    pub write_speed: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotherboardData {
    pub temperature: f64,
    pub voltage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkData {
    pub bytes_received: f64,
    pub bytes_sent: f64,
    pub packets_received: f64,
    pub packets_sent: f64,
}

/// Full sensor snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensorData {
    pub cpu: CpuData,
    pub gpu: GpuData,
    pub memory: MemoryData,
    pub storage: Vec<StorageDevice>,
    /// Fan speeds in RPM, keyed by sensor name.
    pub fans: BTreeMap<String, f64>,
    /// Voltages keyed by sensor name.
    pub voltages: BTreeMap<String, f64>,
    pub motherboard: MotherboardData,
    pub network: NetworkData,
    /// When this snapshot was produced (Unix milliseconds).
    pub timestamp_ms: i64,
}

impl SensorData {
    /// Resolve a dotted sensor path such as `cpu.usage` or `fans.CPU Fan`.
    ///
    /// Path segments use the serialized (camelCase) field names. Array
    /// elements are addressed by index (`storage.0.usage`). Unknown paths and
    /// non-numeric leaves yield `0.0`.
    pub fn value_at(&self, path: &str) -> f64 {
        match serde_json::to_value(self) {
            Ok(root) => lookup_path(&root, path),
            Err(_) => 0.0,
        }
    }
}

/// Walk a JSON value along a dotted path and return the numeric leaf.
pub fn lookup_path(root: &Value, path: &str) -> f64 {
    let mut current = root;
    for key in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return 0.0,
        }
    }
    current.as_f64().unwrap_or(0.0)
}

/// Single upstream sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub name: String,
    /// Sensor kind: "Temperature", "Load", "Fan", "Voltage", "Clock", "Data", "Control".
    pub sensor_type: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

/// Upstream hardware record grouping the sensors of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareComponent {
    pub name: String,
    /// Hardware kind: "Cpu", "GpuNvidia", "GpuAmd", "Memory", "Motherboard", "Storage".
    pub hardware_type: String,
    #[serde(default)]
    pub sensors: Vec<SensorReading>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SensorData {
        let mut data = SensorData::default();
        data.cpu.usage = 42.5;
        data.gpu.fan_speed = 55.0;
        data.fans.insert("CPU Fan".to_string(), 1200.0);
        data.storage.push(StorageDevice {
            name: "NVMe SSD".to_string(),
            usage: 70.0,
            ..Default::default()
        });
        data
    }

    #[test]
    fn test_value_at_nested_fields() {
        let data = sample();
        assert_eq!(data.value_at("cpu.usage"), 42.5);
        assert_eq!(data.value_at("gpu.fanSpeed"), 55.0);
        assert_eq!(data.value_at("fans.CPU Fan"), 1200.0);
        assert_eq!(data.value_at("storage.0.usage"), 70.0);
    }

    #[test]
    fn test_value_at_unknown_or_non_numeric_is_zero() {
        let data = sample();
        assert_eq!(data.value_at("cpu.missing"), 0.0);
        assert_eq!(data.value_at("storage.5.usage"), 0.0);
        assert_eq!(data.value_at("storage.0.name"), 0.0);
        assert_eq!(data.value_at("cpu"), 0.0);
        assert_eq!(data.value_at(""), 0.0);
    }

    #[test]
    fn test_sensor_data_wire_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value["gpu"].get("fanSpeed").is_some());
        assert!(value["gpu"].get("powerUsage").is_some());
        assert!(value["network"].get("bytesReceived").is_some());
        assert!(value.get("timestampMs").is_some());
    }

    #[test]
    fn test_partial_sensor_data_deserializes_with_defaults() {
        let data: SensorData = serde_json::from_value(json!({
            "cpu": { "usage": 12.0 }
        }))
        .unwrap();
        assert_eq!(data.cpu.usage, 12.0);
        assert!(data.storage.is_empty());
        assert_eq!(data.memory.total, 0.0);
    }

    #[test]
    fn test_hardware_component_parses_upstream_shape() {
        let raw = json!([{
            "name": "AMD Ryzen 7",
            "hardwareType": "Cpu",
            "sensors": [
                { "name": "CPU Total", "sensorType": "Load", "value": 31.5, "unit": "%", "identifier": "/cpu/0/load/0" }
            ]
        }]);
        let parsed: Vec<HardwareComponent> = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed[0].hardware_type, "Cpu");
        assert_eq!(parsed[0].sensors[0].sensor_type, "Load");
        assert_eq!(parsed[0].sensors[0].value, 31.5);
    }
}
