//! Alert conditions and fired-alert history.

use crate::storage::{load_json, save_json, KeyValueStore, ALERTS_KEY, ALERT_HISTORY_KEY};
use parking_lot::RwLock;
use sensecanvas_core::{Alert, AlertCondition, AlertConditionPatch, SensorData};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of fired alerts kept, newest first.
pub const ALERT_HISTORY_CAPACITY: usize = 100;

#[derive(Default)]
struct AlertState {
    conditions: Vec<AlertCondition>,
    history: Vec<Alert>,
}

/// Edge-triggered alert evaluation over user conditions.
pub struct AlertStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<AlertState>,
}

impl AlertStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: RwLock::new(AlertState::default()),
        }
    }

    /// Create and load conditions and history from storage.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);
        store.init();
        store
    }

    pub fn init(&self) {
        let storage = self.storage.as_ref();
        let conditions: Vec<AlertCondition> = load_json(storage, ALERTS_KEY).unwrap_or_default();
        let mut history: Vec<Alert> = load_json(storage, ALERT_HISTORY_KEY).unwrap_or_default();
        history.truncate(ALERT_HISTORY_CAPACITY);

        info!(
            conditions = conditions.len(),
            history = history.len(),
            "Loaded alert state"
        );
        let mut state = self.state.write();
        state.conditions = conditions;
        state.history = history;
    }

    pub fn conditions(&self) -> Vec<AlertCondition> {
        self.state.read().conditions.clone()
    }

    /// Fired alerts, newest first.
    pub fn history(&self) -> Vec<Alert> {
        self.state.read().history.clone()
    }

    pub fn unacknowledged_count(&self) -> usize {
        self.state
            .read()
            .history
            .iter()
            .filter(|a| !a.acknowledged)
            .count()
    }

    /// Add a condition. It starts un-triggered; returns its id.
    pub fn add_condition(&self, mut condition: AlertCondition) -> String {
        condition.triggered = false;
        let id = condition.id.clone();
        let mut state = self.state.write();
        state.conditions.push(condition);
        save_json(self.storage.as_ref(), ALERTS_KEY, &state.conditions);
        debug!(condition_id = %id, "Alert condition added");
        id
    }

    pub fn update_condition(&self, id: &str, patch: AlertConditionPatch) -> bool {
        let mut state = self.state.write();
        let Some(condition) = state.conditions.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        condition.apply(patch);
        save_json(self.storage.as_ref(), ALERTS_KEY, &state.conditions);
        true
    }

    pub fn remove_condition(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let before = state.conditions.len();
        state.conditions.retain(|c| c.id != id);
        let removed = state.conditions.len() != before;
        if removed {
            save_json(self.storage.as_ref(), ALERTS_KEY, &state.conditions);
        }
        removed
    }

    /// Evaluate every enabled condition against `data`.
    ///
    /// A condition fires once when it becomes satisfied and re-arms when it
    /// stops being satisfied. Returns the alerts fired by this call.
    pub fn check(&self, data: &SensorData) -> Vec<Alert> {
        let mut state = self.state.write();
        let mut fired = Vec::new();
        let mut conditions_changed = false;

        for condition in state.conditions.iter_mut().filter(|c| c.enabled) {
            let value = data.value_at(&condition.sensor_path);
            let satisfied = condition.operator.evaluate(value, condition.threshold);

            if satisfied && !condition.triggered {
                condition.triggered = true;
                conditions_changed = true;
                let alert = Alert::fired(condition, value);
                warn!(
                    condition = %condition.name,
                    sensor_path = %condition.sensor_path,
                    value,
                    threshold = condition.threshold,
                    "Alert fired"
                );
                fired.push(alert);
            } else if !satisfied && condition.triggered {
                condition.triggered = false;
                conditions_changed = true;
                debug!(condition = %condition.name, value, "Alert re-armed");
            }
        }

        if !fired.is_empty() {
            // Newest first; within one check, later conditions are newer.
            for alert in &fired {
                state.history.insert(0, alert.clone());
            }
            state.history.truncate(ALERT_HISTORY_CAPACITY);
            save_json(self.storage.as_ref(), ALERT_HISTORY_KEY, &state.history);
        }
        if conditions_changed {
            save_json(self.storage.as_ref(), ALERTS_KEY, &state.conditions);
        }

        fired
    }

    pub fn acknowledge(&self, alert_id: &str) -> bool {
        let mut state = self.state.write();
        let Some(alert) = state.history.iter_mut().find(|a| a.id == alert_id) else {
            return false;
        };
        alert.acknowledged = true;
        save_json(self.storage.as_ref(), ALERT_HISTORY_KEY, &state.history);
        true
    }

    pub fn clear_history(&self) {
        let mut state = self.state.write();
        state.history.clear();
        save_json(self.storage.as_ref(), ALERT_HISTORY_KEY, &state.history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use sensecanvas_core::AlertOperator;

    fn data(cpu_temp: f64) -> SensorData {
        let mut data = SensorData::default();
        data.cpu.temperature = cpu_temp;
        data
    }

    fn hot_cpu() -> AlertCondition {
        AlertCondition::new("Hot CPU", "cpu.temperature", AlertOperator::Greater, 80.0, "°C")
    }

    #[test]
    fn test_alert_is_edge_triggered() {
        let store = AlertStore::new(Arc::new(MemoryStorage::new()));
        store.add_condition(hot_cpu());

        assert!(store.check(&data(70.0)).is_empty());

        let fired = store.check(&data(85.0));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].condition, "Hot CPU");
        assert_eq!(fired[0].value, 85.0);

        // Still hot: no new alert.
        assert!(store.check(&data(90.0)).is_empty());
        assert!(store.conditions()[0].triggered);

        // Cools down, re-arms, fires again.
        assert!(store.check(&data(60.0)).is_empty());
        assert!(!store.conditions()[0].triggered);
        assert_eq!(store.check(&data(81.0)).len(), 1);
        assert_eq!(store.history().len(), 2);
    }

    #[test]
    fn test_disabled_condition_never_fires() {
        let store = AlertStore::new(Arc::new(MemoryStorage::new()));
        let id = store.add_condition(hot_cpu());
        assert!(store.update_condition(
            &id,
            AlertConditionPatch {
                enabled: Some(false),
                ..Default::default()
            }
        ));
        assert!(store.check(&data(99.0)).is_empty());
        assert!(!store.update_condition("missing", AlertConditionPatch::default()));
    }

    #[test]
    fn test_history_is_newest_first_and_capped() {
        let store = AlertStore::new(Arc::new(MemoryStorage::new()));
        store.add_condition(hot_cpu());

        for i in 0..150 {
            store.check(&data(90.0 + i as f64));
            store.check(&data(20.0));
        }

        let history = store.history();
        assert_eq!(history.len(), ALERT_HISTORY_CAPACITY);
        assert_eq!(history[0].value, 239.0);
        assert_eq!(history[99].value, 140.0);
    }

    #[test]
    fn test_acknowledge_and_clear() {
        let store = AlertStore::new(Arc::new(MemoryStorage::new()));
        store.add_condition(hot_cpu());
        let alert = store.check(&data(95.0)).remove(0);

        assert_eq!(store.unacknowledged_count(), 1);
        assert!(store.acknowledge(&alert.id));
        assert!(!store.acknowledge("missing"));
        assert_eq!(store.unacknowledged_count(), 0);
        assert!(store.history()[0].acknowledged);

        store.clear_history();
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_state_survives_reopen() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let store = AlertStore::open(storage.clone());
            store.add_condition(hot_cpu());
            store.check(&data(95.0));
        }

        let store = AlertStore::open(storage);
        let conditions = store.conditions();
        assert_eq!(conditions.len(), 1);
        assert!(conditions[0].triggered);
        assert_eq!(store.history().len(), 1);
        // Triggered state persisted, so the same reading does not fire again.
        assert!(store.check(&data(95.0)).is_empty());
    }

    #[test]
    fn test_remove_condition() {
        let store = AlertStore::new(Arc::new(MemoryStorage::new()));
        let id = store.add_condition(hot_cpu());
        assert!(store.remove_condition(&id));
        assert!(!store.remove_condition(&id));
        assert!(store.check(&data(99.0)).is_empty());
    }
}
