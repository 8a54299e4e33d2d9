//! Mapping of upstream hardware records into `SensorData`.
//!
//! Matching is by fixed hardware/sensor type names; there is no schema
//! validation beyond what JSON deserialization enforces.

use crate::error::{StreamError, StreamResult};
use sensecanvas_core::{HardwareComponent, SensorData};
use tracing::trace;

/// Parse a WebSocket payload (a JSON array of hardware records).
pub fn parse_payload(text: &str) -> StreamResult<SensorData> {
    let hardware: Vec<HardwareComponent> =
        serde_json::from_str(text).map_err(|e| StreamError::ParseError(e.to_string()))?;
    Ok(map_hardware(&hardware))
}

/// Flatten hardware records into a `SensorData` snapshot.
///
/// Later sensors of the same kind overwrite earlier ones.
pub fn map_hardware(hardware: &[HardwareComponent]) -> SensorData {
    let mut parsed = SensorData::default();

    for component in hardware {
        let kind = component.hardware_type.as_str();
        let is_gpu = kind.starts_with("Gpu");

        for sensor in &component.sensors {
            let value = sensor.value;
            match (kind, sensor.sensor_type.as_str()) {
                ("Cpu", "Load") => parsed.cpu.usage = value,
                ("Cpu", "Temperature") => parsed.cpu.temperature = value,
                // MHz upstream, GHz in the snapshot.
                ("Cpu", "Clock") => parsed.cpu.frequency = value / 1000.0,
                ("Cpu", "Voltage") => parsed.cpu.voltage = value,
                (_, "Load") if is_gpu => parsed.gpu.usage = value,
                (_, "Temperature") if is_gpu => parsed.gpu.temperature = value,
                (_, "Fan") if is_gpu => parsed.gpu.fan_speed = value,
                (_, "Voltage") if is_gpu => parsed.gpu.voltage = value,
                ("Memory", "Load") => parsed.memory.usage = value,
                ("Memory", "Data") => {
                    if sensor.name.contains("Available") {
                        parsed.memory.available = value;
                    }
                    if sensor.name.contains("Used") {
                        parsed.memory.total = value;
                    }
                }
                _ => {}
            }

            match sensor.sensor_type.as_str() {
                "Fan" => {
                    parsed.fans.insert(sensor.name.clone(), value);
                }
                "Voltage" => {
                    parsed.voltages.insert(sensor.name.clone(), value);
                }
                _ => {}
            }
        }

        trace!(
            component = %component.name,
            hardware_type = %component.hardware_type,
            sensors = component.sensors.len(),
            "Mapped hardware component"
        );
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> String {
        json!([
            {
                "name": "AMD Ryzen 9",
                "hardwareType": "Cpu",
                "sensors": [
                    { "name": "CPU Total", "sensorType": "Load", "value": 37.5, "unit": "%" },
                    { "name": "Core (Tctl/Tdie)", "sensorType": "Temperature", "value": 61.0, "unit": "°C" },
                    { "name": "Core #1", "sensorType": "Clock", "value": 4200.0, "unit": "MHz" },
                    { "name": "CPU Core", "sensorType": "Voltage", "value": 1.25, "unit": "V" }
                ]
            },
            {
                "name": "NVIDIA RTX",
                "hardwareType": "GpuNvidia",
                "sensors": [
                    { "name": "GPU Core", "sensorType": "Load", "value": 88.0, "unit": "%" },
                    { "name": "GPU Core", "sensorType": "Temperature", "value": 72.0, "unit": "°C" },
                    { "name": "GPU Fan", "sensorType": "Fan", "value": 1650.0, "unit": "RPM" }
                ]
            },
            {
                "name": "Generic Memory",
                "hardwareType": "Memory",
                "sensors": [
                    { "name": "Memory", "sensorType": "Load", "value": 54.0, "unit": "%" },
                    { "name": "Memory Available", "sensorType": "Data", "value": 14.2, "unit": "GB" },
                    { "name": "Memory Used", "sensorType": "Data", "value": 17.8, "unit": "GB" }
                ]
            },
            {
                "name": "ASUS Board",
                "hardwareType": "Motherboard",
                "sensors": [
                    { "name": "Chassis Fan #1", "sensorType": "Fan", "value": 900.0, "unit": "RPM" },
                    { "name": "+12V", "sensorType": "Voltage", "value": 12.1, "unit": "V" }
                ]
            }
        ])
        .to_string()
    }

    #[test]
    fn test_cpu_fields() {
        let data = parse_payload(&payload()).unwrap();
        assert_eq!(data.cpu.usage, 37.5);
        assert_eq!(data.cpu.temperature, 61.0);
        assert!((data.cpu.frequency - 4.2).abs() < 1e-9);
        assert_eq!(data.cpu.voltage, 1.25);
    }

    #[test]
    fn test_gpu_and_memory_fields() {
        let data = parse_payload(&payload()).unwrap();
        assert_eq!(data.gpu.usage, 88.0);
        assert_eq!(data.gpu.temperature, 72.0);
        assert_eq!(data.gpu.fan_speed, 1650.0);
        assert_eq!(data.memory.usage, 54.0);
        assert_eq!(data.memory.available, 14.2);
        assert_eq!(data.memory.total, 17.8);
    }

    #[test]
    fn test_fans_and_voltages_collected_across_components() {
        let data = parse_payload(&payload()).unwrap();
        assert_eq!(data.fans.get("GPU Fan"), Some(&1650.0));
        assert_eq!(data.fans.get("Chassis Fan #1"), Some(&900.0));
        assert_eq!(data.voltages.get("CPU Core"), Some(&1.25));
        assert_eq!(data.voltages.get("+12V"), Some(&12.1));
    }

    #[test]
    fn test_unknown_hardware_is_ignored() {
        let data = parse_payload(
            &json!([{ "name": "Pump", "hardwareType": "Cooler", "sensors": [
                { "name": "Flow", "sensorType": "Flow", "value": 3.0 }
            ]}])
            .to_string(),
        )
        .unwrap();
        assert_eq!(data, SensorData::default());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(matches!(
            parse_payload("not json"),
            Err(StreamError::ParseError(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"cpu": {}}"#),
            Err(StreamError::ParseError(_))
        ));
    }
}
