//! WebSocket broadcast functionality.
//!
//! The broadcaster collects sensor updates at a fixed interval and forwards
//! them, plus any alerts fired since the previous tick, to all connected
//! WebSocket clients.

use std::time::Duration;

use sensecanvas_core::Alert;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::state::DashboardState;
use crate::types::DashboardMessage;

fn send(tx: &broadcast::Sender<String>, msg: &DashboardMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => match tx.send(json) {
            Ok(n) => trace!(receivers = n, "Broadcast sent"),
            // No receivers - normal when no clients are connected.
            Err(_) => trace!("No WebSocket receivers connected"),
        },
        Err(e) => debug!(error = %e, "Failed to serialize dashboard message"),
    }
}

/// Alerts newer than `last_seen`, oldest first. `history` is newest first.
fn alerts_since(history: &[Alert], last_seen: Option<&str>) -> Vec<Alert> {
    let mut fresh: Vec<Alert> = history
        .iter()
        .take_while(|a| Some(a.id.as_str()) != last_seen)
        .cloned()
        .collect();
    fresh.reverse();
    fresh
}

/// Run the broadcaster task until `shutdown` is cancelled.
pub async fn run_broadcaster(
    state: DashboardState,
    tx: broadcast::Sender<String>,
    interval_ms: u64,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));

    // Only alerts fired after startup are pushed.
    let mut last_alert_id = state.alerts().history().first().map(|a| a.id.clone());

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Broadcaster stopped");
                return;
            }
            _ = interval.tick() => {}
        }

        let history = state.alerts().history();
        for alert in alerts_since(&history, last_alert_id.as_deref()) {
            send(&tx, &DashboardMessage::Alert(alert));
        }
        // A cleared history resets the marker.
        last_alert_id = history.first().map(|a| a.id.clone());

        send(&tx, &DashboardMessage::Update(state.collect_update()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensecanvas_core::{AlertCondition, AlertOperator, SensorData};
    use sensecanvas_store::{AlertStore, LayoutStore, MemoryStorage, ThemeStore};
    use sensecanvas_stream::SensorHub;
    use std::sync::Arc;

    fn alert(id: &str) -> Alert {
        Alert {
            id: id.to_string(),
            condition: "c".to_string(),
            value: 1.0,
            timestamp: 0,
            acknowledged: false,
        }
    }

    #[test]
    fn test_alerts_since_returns_oldest_first() {
        let history = vec![alert("c"), alert("b"), alert("a")];
        let ids: Vec<String> = alerts_since(&history, Some("a"))
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["b", "c"]);

        assert!(alerts_since(&history, Some("c")).is_empty());
        assert_eq!(alerts_since(&history, None).len(), 3);
    }

    async fn next_message(rx: &mut broadcast::Receiver<String>) -> serde_json::Value {
        let json = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("broadcaster went quiet")
            .unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[tokio::test]
    async fn test_fired_alert_precedes_next_update() {
        let storage = Arc::new(MemoryStorage::new());
        let state = DashboardState::new(
            Arc::new(SensorHub::default()),
            Arc::new(LayoutStore::open(storage.clone())),
            Arc::new(AlertStore::open(storage.clone())),
            Arc::new(ThemeStore::open(storage)),
        );
        state.alerts().add_condition(AlertCondition::new(
            "Busy CPU",
            "cpu.usage",
            AlertOperator::Greater,
            90.0,
            "%",
        ));

        let mut busy = SensorData::default();
        busy.cpu.usage = 95.0;
        let idle = SensorData::default();

        // Fired before startup: never pushed.
        assert_eq!(state.alerts().check(&busy).len(), 1);
        assert!(state.alerts().check(&idle).is_empty());

        let (tx, _) = broadcast::channel::<String>(1024);
        let mut rx = tx.subscribe();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_broadcaster(
            state.clone(),
            tx,
            10,
            shutdown.clone(),
        ));

        assert_eq!(next_message(&mut rx).await["type"], "update");

        let fired = state.alerts().check(&busy);
        assert_eq!(fired.len(), 1);

        // Ticks that ran before the check only carry updates.
        let mut msg = next_message(&mut rx).await;
        while msg["type"] == "update" {
            msg = next_message(&mut rx).await;
        }
        assert_eq!(msg["type"], "alert");
        assert_eq!(msg["id"], fired[0].id.as_str());
        assert_eq!(next_message(&mut rx).await["type"], "update");

        shutdown.cancel();
        task.await.unwrap();
    }
}
