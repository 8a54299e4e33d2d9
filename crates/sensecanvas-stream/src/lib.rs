//! Sensor stream client for SenseCanvas.
//!
//! Keeps a live `SensorData` snapshot up to date:
//! - WebSocket feed of hardware-sensor records with reconnect backoff (1s → 30s)
//! - Throttled publishing (latest write wins, intermediate updates dropped)
//! - Synthetic mock feed for development or when the live feed is down
//! - Capped rolling history of recent samples

pub mod backoff;
pub mod connection;
pub mod error;
pub mod history;
pub mod hub;
pub mod mapper;
pub mod mock;
pub mod throttle;

pub use backoff::ReconnectBackoff;
pub use connection::{ConnectionStatus, SensorStreamClient, StreamConfig, StreamMode};
pub use error::{StreamError, StreamResult};
pub use history::SampleHistory;
pub use hub::SensorHub;
pub use mapper::{map_hardware, parse_payload};
pub use mock::MockGenerator;
pub use throttle::UpdateThrottle;
