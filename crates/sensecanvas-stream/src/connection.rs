//! Sensor stream client.
//!
//! Handles the upstream WebSocket lifecycle, automatic reconnection with
//! exponential backoff, and the mock generator used when no live feed is
//! available.

use crate::backoff::ReconnectBackoff;
use crate::error::{StreamError, StreamResult};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::hub::SensorHub;
use crate::mapper::parse_payload;
use crate::mock::MockGenerator;
use crate::throttle::UpdateThrottle;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Where sensor data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    /// Upstream WebSocket only.
    Live,
    /// Mock generator only.
    Mock,
    /// Upstream WebSocket, with the mock generator filling in while the
    /// live feed is not connected.
    #[default]
    Auto,
}

/// Connection status as seen by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    /// Fed by the mock generator (mock mode).
    Mock,
    /// Reconnect attempts exhausted.
    Error,
}

/// Stream client configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Upstream WebSocket URL.
    pub url: String,
    pub mode: StreamMode,
    /// Floor of the reconnect delay.
    pub reconnect_base_delay_ms: u64,
    /// Ceiling of the reconnect delay.
    pub reconnect_max_delay_ms: u64,
    /// Maximum consecutive reconnect attempts (0 = infinite).
    pub max_reconnect_attempts: u32,
    /// Live updates closer together than this are dropped.
    pub min_update_interval_ms: u64,
    pub mock_interval_ms: u64,
    pub history_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000/sensors".to_string(),
            mode: StreamMode::Auto,
            reconnect_base_delay_ms: 1_000,
            reconnect_max_delay_ms: 30_000,
            max_reconnect_attempts: 0, // Infinite
            min_update_interval_ms: 1_000,
            mock_interval_ms: 2_000,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Sensor stream client.
///
/// Publishes every accepted update to the shared [`SensorHub`].
pub struct SensorStreamClient {
    config: StreamConfig,
    hub: Arc<SensorHub>,
    backoff: Mutex<ReconnectBackoff>,
    throttle: Mutex<UpdateThrottle>,
    /// Cancellation token for graceful shutdown.
    shutdown_token: CancellationToken,
}

impl SensorStreamClient {
    pub fn new(config: StreamConfig, hub: Arc<SensorHub>) -> Self {
        let backoff =
            ReconnectBackoff::new(config.reconnect_base_delay_ms, config.reconnect_max_delay_ms);
        let throttle = UpdateThrottle::new(Duration::from_millis(config.min_update_interval_ms));
        Self {
            config,
            hub,
            backoff: Mutex::new(backoff),
            throttle: Mutex::new(throttle),
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn hub(&self) -> Arc<SensorHub> {
        self.hub.clone()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Consecutive failed connection attempts since the last success.
    pub fn reconnect_attempts(&self) -> u32 {
        self.backoff.lock().attempts()
    }

    /// Signal graceful shutdown.
    ///
    /// Closes the live connection, cancels any pending reconnect and stops
    /// the mock generator.
    pub fn shutdown(&self) {
        info!("Sensor stream shutdown requested");
        self.shutdown_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Run until shutdown, or until reconnect attempts are exhausted in
    /// live mode.
    pub async fn run(&self) -> StreamResult<()> {
        info!(mode = ?self.config.mode, url = %self.config.url, "Starting sensor stream");

        match self.config.mode {
            StreamMode::Mock => {
                self.run_mock(false).await;
                Ok(())
            }
            StreamMode::Live => self.connect_with_retry().await,
            StreamMode::Auto => {
                let (result, ()) = tokio::join!(self.connect_with_retry(), self.run_mock(true));
                result
            }
        }
    }

    async fn connect_with_retry(&self) -> StreamResult<()> {
        loop {
            if self.is_shutdown() {
                info!("Shutdown requested, exiting connect loop");
                self.hub.set_status(ConnectionStatus::Disconnected);
                return Ok(());
            }

            self.hub.set_status(ConnectionStatus::Connecting);

            match self.try_connect().await {
                Ok(()) => info!("Sensor WebSocket closed"),
                Err(e) => warn!(error = %e, "Sensor WebSocket error"),
            }

            self.hub.set_status(ConnectionStatus::Disconnected);

            if self.is_shutdown() {
                info!("Shutdown requested after disconnect, not reconnecting");
                return Ok(());
            }

            let (attempt, delay) = {
                let mut backoff = self.backoff.lock();
                let delay = backoff.next_delay();
                (backoff.attempts(), delay)
            };

            if self.config.max_reconnect_attempts > 0
                && attempt >= self.config.max_reconnect_attempts
            {
                error!(attempt, "Max reconnection attempts reached");
                self.hub.set_status(ConnectionStatus::Error);
                return Err(StreamError::ReconnectExhausted(attempt));
            }

            warn!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");

            // Single pending reconnect; shutdown cancels it.
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during backoff, exiting");
                    return Ok(());
                }
            }
        }
    }

    async fn try_connect(&self) -> StreamResult<()> {
        info!(url = %self.config.url, "Connecting to sensor WebSocket");

        let connect = connect_async_tls_with_config(&self.config.url, None, true, None);
        let (ws_stream, _response) = tokio::select! {
            result = connect => result?,
            () = self.shutdown_token.cancelled() => return Ok(()),
        };
        let (mut write, mut read) = ws_stream.split();

        self.backoff.lock().reset();
        self.throttle.lock().reset();
        self.hub.set_status(ConnectionStatus::Connected);
        info!("Sensor WebSocket connected");

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(error = %e, "Failed to send Close frame during shutdown");
                    }
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_text_message(&text, Instant::now());
                        }
                        Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                            Ok(text) => {
                                self.handle_text_message(text, Instant::now());
                            }
                            Err(_) => debug!(len = bytes.len(), "Ignoring non-UTF-8 binary frame"),
                        },
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "Sensor WebSocket closed by server");
                            return Err(StreamError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Sensor WebSocket read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!("Sensor WebSocket stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Parse, throttle and publish one upstream payload.
    ///
    /// Returns true if the update was published. Malformed payloads are
    /// dropped and do not consume the throttle window.
    fn handle_text_message(&self, text: &str, now: Instant) -> bool {
        let data = match parse_payload(text) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, len = text.len(), "Dropping malformed sensor payload");
                return false;
            }
        };

        if !self.throttle.lock().try_acquire(now) {
            debug!("Sensor update throttled");
            return false;
        }

        self.hub.publish(data);
        true
    }

    /// Mock generator loop.
    ///
    /// With `fallback` set the generator only publishes while the live feed
    /// is not connected and leaves the status to the live loop.
    async fn run_mock(&self, fallback: bool) {
        let mut generator = MockGenerator::new();
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.mock_interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if !fallback {
            self.hub.set_status(ConnectionStatus::Mock);
        }
        info!(
            interval_ms = self.config.mock_interval_ms,
            fallback, "Starting mock sensor stream"
        );

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => break,
                _ = ticker.tick() => {
                    if fallback && self.hub.status() == ConnectionStatus::Connected {
                        continue;
                    }
                    self.hub.publish(generator.sample());
                }
            }
        }

        if !fallback {
            self.hub.set_status(ConnectionStatus::Disconnected);
        }
        debug!("Mock sensor stream stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(config: StreamConfig) -> SensorStreamClient {
        let hub = Arc::new(SensorHub::new(config.history_capacity));
        SensorStreamClient::new(config, hub)
    }

    fn payload(cpu_load: f64) -> String {
        json!([{
            "name": "CPU",
            "hardwareType": "Cpu",
            "sensors": [{ "name": "CPU Total", "sensorType": "Load", "value": cpu_load }]
        }])
        .to_string()
    }

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.url, "ws://localhost:8000/sensors");
        assert_eq!(config.mode, StreamMode::Auto);
        assert_eq!(config.reconnect_base_delay_ms, 1_000);
        assert_eq!(config.reconnect_max_delay_ms, 30_000);
        assert_eq!(config.min_update_interval_ms, 1_000);
        assert_eq!(config.mock_interval_ms, 2_000);
    }

    #[test]
    fn test_mode_deserializes_lowercase() {
        let mode: StreamMode = serde_json::from_str("\"live\"").unwrap();
        assert_eq!(mode, StreamMode::Live);
        let status = serde_json::to_string(&ConnectionStatus::Connected).unwrap();
        assert_eq!(status, "\"connected\"");
    }

    #[test]
    fn test_handle_text_message_throttles() {
        let client = client(StreamConfig::default());
        let t0 = Instant::now();

        assert!(client.handle_text_message(&payload(10.0), t0));
        assert!(!client.handle_text_message(&payload(20.0), t0 + Duration::from_millis(500)));
        assert_eq!(client.hub().latest().cpu.usage, 10.0);

        assert!(client.handle_text_message(&payload(30.0), t0 + Duration::from_millis(1_000)));
        assert_eq!(client.hub().latest().cpu.usage, 30.0);
        assert_eq!(client.hub().history_len(), 2);
    }

    #[test]
    fn test_malformed_message_does_not_consume_window() {
        let client = client(StreamConfig::default());
        let t0 = Instant::now();

        assert!(!client.handle_text_message("{not json", t0));
        assert!(client.handle_text_message(&payload(42.0), t0));
        assert_eq!(client.hub().latest().cpu.usage, 42.0);
    }

    #[tokio::test]
    async fn test_mock_mode_publishes_until_shutdown() {
        let client = Arc::new(client(StreamConfig {
            mode: StreamMode::Mock,
            mock_interval_ms: 10,
            ..Default::default()
        }));

        let runner = client.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(client.hub().status(), ConnectionStatus::Mock);
        assert!(client.hub().history_len() >= 2);

        client.shutdown();
        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("run should exit after shutdown")
            .unwrap();
        tokio_test::assert_ok!(result);
        assert_eq!(client.hub().status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_live_mode_gives_up_after_max_attempts() {
        // Nothing listens on port 9; connection is refused immediately.
        let client = client(StreamConfig {
            url: "ws://127.0.0.1:9/sensors".to_string(),
            mode: StreamMode::Live,
            reconnect_base_delay_ms: 10,
            reconnect_max_delay_ms: 20,
            max_reconnect_attempts: 3,
            ..Default::default()
        });

        let result = tokio::time::timeout(Duration::from_secs(5), client.run())
            .await
            .expect("retry loop should terminate");
        assert!(matches!(result, Err(StreamError::ReconnectExhausted(3))));
        assert_eq!(client.hub().status(), ConnectionStatus::Error);
        assert_eq!(client.hub().history_len(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_reconnect() {
        let client = Arc::new(client(StreamConfig {
            url: "ws://127.0.0.1:9/sensors".to_string(),
            mode: StreamMode::Live,
            reconnect_base_delay_ms: 60_000,
            reconnect_max_delay_ms: 60_000,
            ..Default::default()
        }));

        let runner = client.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        tokio::time::sleep(Duration::from_millis(200)).await;
        client.shutdown();

        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("shutdown should interrupt the backoff sleep")
            .unwrap();
        tokio_test::assert_ok!(result);
        assert_eq!(client.hub().status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_auto_mode_falls_back_to_mock() {
        let client = Arc::new(client(StreamConfig {
            url: "ws://127.0.0.1:9/sensors".to_string(),
            mode: StreamMode::Auto,
            reconnect_base_delay_ms: 50,
            reconnect_max_delay_ms: 50,
            mock_interval_ms: 10,
            ..Default::default()
        }));

        let runner = client.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_ne!(client.hub().status(), ConnectionStatus::Connected);
        assert!(client.hub().history_len() >= 2);

        client.shutdown();
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }
}
