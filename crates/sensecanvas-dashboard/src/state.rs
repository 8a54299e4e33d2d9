//! Dashboard state management.
//!
//! DashboardState aggregates the sensor hub and the persistent stores for
//! the HTTP handlers and the broadcaster.

use std::sync::Arc;

use sensecanvas_core::now_ms;
use sensecanvas_store::{AlertStore, LayoutStore, ThemeStore};
use sensecanvas_stream::SensorHub;

use crate::types::{DashboardSnapshot, SensorUpdate};

/// Shared handles to everything the dashboard serves.
#[derive(Clone)]
pub struct DashboardState {
    hub: Arc<SensorHub>,
    layouts: Arc<LayoutStore>,
    alerts: Arc<AlertStore>,
    themes: Arc<ThemeStore>,
}

impl DashboardState {
    pub fn new(
        hub: Arc<SensorHub>,
        layouts: Arc<LayoutStore>,
        alerts: Arc<AlertStore>,
        themes: Arc<ThemeStore>,
    ) -> Self {
        Self {
            hub,
            layouts,
            alerts,
            themes,
        }
    }

    pub fn hub(&self) -> &SensorHub {
        &self.hub
    }

    pub fn layouts(&self) -> &LayoutStore {
        &self.layouts
    }

    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.themes
    }

    /// Collect a full snapshot of the current state.
    pub fn collect_snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            timestamp_ms: now_ms(),
            status: self.hub.status(),
            sensors: self.hub.latest(),
            history_len: self.hub.history_len(),
            theme: self.themes.current_id(),
            layout_id: self.layouts.current().id,
            unacknowledged_alerts: self.alerts.unacknowledged_count(),
        }
    }

    /// Latest readings and status only.
    pub fn collect_update(&self) -> SensorUpdate {
        SensorUpdate {
            timestamp_ms: now_ms(),
            status: self.hub.status(),
            sensors: self.hub.latest(),
        }
    }
}
