//! Threshold alert types.

use crate::sensor::SensorData;
use crate::{new_id, now_ms};
use serde::{Deserialize, Serialize};

/// Tolerance used by `AlertOperator::Equal`.
pub const EQUAL_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertOperator {
    Greater,
    Less,
    Equal,
}

impl AlertOperator {
    pub fn evaluate(self, value: f64, threshold: f64) -> bool {
        match self {
            AlertOperator::Greater => value > threshold,
            AlertOperator::Less => value < threshold,
            AlertOperator::Equal => (value - threshold).abs() < EQUAL_TOLERANCE,
        }
    }
}

/// User-defined alert on a sensor path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCondition {
    pub id: String,
    pub name: String,
    pub sensor_path: String,
    pub operator: AlertOperator,
    pub threshold: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Set while the condition holds; cleared once it stops holding.
    #[serde(default)]
    pub triggered: bool,
}

fn default_enabled() -> bool {
    true
}

impl AlertCondition {
    pub fn new(
        name: impl Into<String>,
        sensor_path: impl Into<String>,
        operator: AlertOperator,
        threshold: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            sensor_path: sensor_path.into(),
            operator,
            threshold,
            unit: unit.into(),
            enabled: true,
            triggered: false,
        }
    }

    /// Whether `data` currently satisfies this condition.
    pub fn is_met_by(&self, data: &SensorData) -> bool {
        self.operator
            .evaluate(data.value_at(&self.sensor_path), self.threshold)
    }

    pub fn apply(&mut self, patch: AlertConditionPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(sensor_path) = patch.sensor_path {
            self.sensor_path = sensor_path;
        }
        if let Some(operator) = patch.operator {
            self.operator = operator;
        }
        if let Some(threshold) = patch.threshold {
            self.threshold = threshold;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
    }
}

/// Partial condition update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertConditionPatch {
    pub name: Option<String>,
    pub sensor_path: Option<String>,
    pub operator: Option<AlertOperator>,
    pub threshold: Option<f64>,
    pub unit: Option<String>,
    pub enabled: Option<bool>,
}

/// A fired alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    /// Name of the condition that fired.
    pub condition: String,
    pub value: f64,
    /// Unix milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub acknowledged: bool,
}

impl Alert {
    pub fn fired(condition: &AlertCondition, value: f64) -> Self {
        Self {
            id: new_id(),
            condition: condition.name.clone(),
            value,
            timestamp: now_ms(),
            acknowledged: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_semantics() {
        assert!(AlertOperator::Greater.evaluate(81.0, 80.0));
        assert!(!AlertOperator::Greater.evaluate(80.0, 80.0));
        assert!(AlertOperator::Less.evaluate(10.0, 20.0));
        assert!(!AlertOperator::Less.evaluate(20.0, 20.0));
        assert!(AlertOperator::Equal.evaluate(50.05, 50.0));
        assert!(!AlertOperator::Equal.evaluate(50.2, 50.0));
    }

    #[test]
    fn test_condition_reads_sensor_path() {
        let mut data = SensorData::default();
        data.cpu.temperature = 91.0;
        let condition =
            AlertCondition::new("CPU hot", "cpu.temperature", AlertOperator::Greater, 80.0, "°C");
        assert!(condition.is_met_by(&data));

        data.cpu.temperature = 60.0;
        assert!(!condition.is_met_by(&data));
    }

    #[test]
    fn test_operator_wire_format() {
        let json = serde_json::to_string(&AlertOperator::Greater).unwrap();
        assert_eq!(json, "\"greater\"");
    }
}
