//! Latest-value hub shared between the stream client and its readers.

use crate::connection::ConnectionStatus;
use crate::history::SampleHistory;
use parking_lot::RwLock;
use sensecanvas_core::{now_ms, SensorData};
use tokio::sync::watch;
use tracing::debug;

/// Holds the current snapshot, connection status and recent history.
///
/// Writers replace the snapshot wholesale; readers either poll
/// [`SensorHub::latest`] or wait on a [`watch::Receiver`].
pub struct SensorHub {
    data_tx: watch::Sender<SensorData>,
    status_tx: watch::Sender<ConnectionStatus>,
    history: RwLock<SampleHistory>,
}

impl SensorHub {
    pub fn new(history_capacity: usize) -> Self {
        let (data_tx, _) = watch::channel(SensorData::default());
        let (status_tx, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            data_tx,
            status_tx,
            history: RwLock::new(SampleHistory::new(history_capacity)),
        }
    }

    /// Replace the snapshot and append it to history.
    ///
    /// A zero `timestamp_ms` is stamped with the publish time.
    pub fn publish(&self, mut data: SensorData) {
        if data.timestamp_ms == 0 {
            data.timestamp_ms = now_ms();
        }
        self.history.write().push(data.clone());
        self.data_tx.send_replace(data);
    }

    pub fn subscribe(&self) -> watch::Receiver<SensorData> {
        self.data_tx.subscribe()
    }

    pub fn status_receiver(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    pub fn latest(&self) -> SensorData {
        self.data_tx.borrow().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status_tx.borrow()
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        let previous = self.status_tx.send_replace(status);
        if previous != status {
            debug!(?previous, current = ?status, "Stream status changed");
        }
    }

    /// History oldest first.
    pub fn history(&self) -> Vec<SensorData> {
        self.history.read().to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    /// Look up a dotted sensor path in the latest snapshot.
    pub fn value(&self, path: &str) -> f64 {
        self.data_tx.borrow().value_at(path)
    }
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new(crate::history::DEFAULT_HISTORY_CAPACITY)
    }
}
