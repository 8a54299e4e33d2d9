//! Main application orchestration.
//!
//! Coordinates all components:
//! - Sensor stream client (live feed, mock fallback)
//! - Persistent layout, alert and theme stores
//! - Periodic alert checks
//! - Dashboard server

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use sensecanvas_dashboard::{DashboardConfig, DashboardState};
use sensecanvas_store::{
    AlertStore, FileStorage, KeyValueStore, LayoutStore, MemoryStorage, ThemeStore,
};
use sensecanvas_stream::{SensorHub, SensorStreamClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How long background tasks get to finish after shutdown is signalled.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Main application.
pub struct Application {
    config: AppConfig,
    hub: Arc<SensorHub>,
    layouts: Arc<LayoutStore>,
    alerts: Arc<AlertStore>,
    themes: Arc<ThemeStore>,
    shutdown: CancellationToken,
}

impl Application {
    /// Create the application and load persisted state.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let storage: Arc<dyn KeyValueStore> = if config.storage.is_in_memory() {
            info!("No data directory configured, keeping state in memory");
            Arc::new(MemoryStorage::new())
        } else {
            let storage = FileStorage::new(&config.storage.data_dir);
            if !storage.is_available() {
                warn!(
                    data_dir = %config.storage.data_dir,
                    "Storage unavailable, changes will not persist"
                );
            }
            Arc::new(storage)
        };

        if config.stream.history_capacity == 0 {
            return Err(AppError::Config(
                "stream.history_capacity must be at least 1".to_string(),
            ));
        }

        let hub = Arc::new(SensorHub::new(config.stream.history_capacity));
        let layouts = Arc::new(LayoutStore::open(storage.clone()));
        let alerts = Arc::new(AlertStore::open(storage.clone()));
        let themes = Arc::new(ThemeStore::open(storage));

        Ok(Self {
            config,
            hub,
            layouts,
            alerts,
            themes,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn hub(&self) -> Arc<SensorHub> {
        self.hub.clone()
    }

    pub fn layouts(&self) -> Arc<LayoutStore> {
        self.layouts.clone()
    }

    pub fn alerts(&self) -> Arc<AlertStore> {
        self.alerts.clone()
    }

    pub fn themes(&self) -> Arc<ThemeStore> {
        self.themes.clone()
    }

    /// Cancelling this token stops `run`, same as Ctrl-C.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn dashboard_state(&self) -> DashboardState {
        DashboardState::new(
            self.hub.clone(),
            self.layouts.clone(),
            self.alerts.clone(),
            self.themes.clone(),
        )
    }

    /// Run until Ctrl-C or the shutdown token is cancelled.
    pub async fn run(self) -> AppResult<()> {
        info!(mode = ?self.config.stream.mode, "Starting application");

        let client = Arc::new(SensorStreamClient::new(
            self.config.stream_config(),
            self.hub.clone(),
        ));
        let stream_client = client.clone();
        let stream_handle = tokio::spawn(async move {
            if let Err(e) = stream_client.run().await {
                error!(error = %e, "Sensor stream stopped");
            }
        });

        let alert_handle = tokio::spawn(run_alert_checks(
            self.hub.clone(),
            self.alerts.clone(),
            Duration::from_millis(self.config.alerts.check_interval_ms),
            self.shutdown.clone(),
        ));

        let dashboard_handle = if self.config.dashboard.enabled {
            let state = self.dashboard_state();
            let config = self.config.dashboard.clone();
            let token = self.shutdown.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = run_dashboard(state, config, token).await {
                    error!(error = %e, "Dashboard server failed");
                }
            }))
        } else {
            info!("Dashboard disabled");
            None
        };

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Shutdown signal received");
            }
            () = self.shutdown.cancelled() => {
                info!("Shutdown requested");
            }
        }

        self.shutdown.cancel();
        client.shutdown();

        join_with_grace("stream", stream_handle).await;
        join_with_grace("alerts", alert_handle).await;
        if let Some(handle) = dashboard_handle {
            join_with_grace("dashboard", handle).await;
        }

        info!(
            samples = self.hub.history_len(),
            unacknowledged_alerts = self.alerts.unacknowledged_count(),
            "Shut down"
        );
        Ok(())
    }
}

async fn join_with_grace(name: &str, mut handle: JoinHandle<()>) {
    match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
        Ok(Ok(())) => debug!(task = name, "Task finished"),
        Ok(Err(e)) => warn!(task = name, error = %e, "Task panicked or was cancelled"),
        Err(_) => {
            warn!(task = name, "Task did not stop in time, aborting");
            handle.abort();
        }
    }
}

/// Serve the dashboard until `shutdown` is cancelled.
pub async fn run_dashboard(
    state: DashboardState,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> AppResult<()> {
    sensecanvas_dashboard::run_server(state, config, shutdown)
        .await
        .map_err(AppError::Dashboard)
}

/// Evaluate alert conditions against the latest sample every `period`.
pub async fn run_alert_checks(
    hub: Arc<SensorHub>,
    alerts: Arc<AlertStore>,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Alert checks stopped");
                return;
            }
            _ = interval.tick() => {}
        }

        let fired = alerts.check(&hub.latest());
        if !fired.is_empty() {
            debug!(count = fired.len(), "Alerts fired");
        }
    }
}
