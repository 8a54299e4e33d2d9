//! Widget and dashboard layout types.
//!
//! A `DashboardLayout` owns its widgets exclusively. Widget ids are unique
//! within a layout; layouts never reference each other's widgets.

use crate::error::{CoreError, Result};
use crate::geometry::{clamp_grid_size, snap_to_grid, Position, Rect, Size};
use crate::{new_id, now_ms};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Id of the built-in layout.
pub const DEFAULT_LAYOUT_ID: &str = "default";
/// Grid cell size used by new layouts.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;
/// Theme used by new layouts.
pub const DEFAULT_THEME_ID: &str = "dark";

/// Visual widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetType {
    #[default]
    Gauge,
    Graph,
    Simple,
    Meter,
    MultiResource,
    CircularGauge,
    LinearGauge,
    Speedometer,
    KpiCard,
    ArcMeter,
    CosmicSensor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub font_size: f64,
    pub font_weight: String,
    pub color: String,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            font_weight: "600".to_string(),
            color: "#1f2937".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    pub thickness: f64,
    pub style: String,
    pub radius: f64,
}

impl Default for Borders {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            style: "solid".to_string(),
            radius: 8.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_labels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_grid: Option<bool>,
}

/// Widget styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Appearance {
    /// Low/mid/high colors.
    pub colors: Vec<String>,
    pub typography: Typography,
    pub borders: Borders,
    pub chart_params: ChartParams,
}

fn default_widget_size() -> Size {
    Size::new(200.0, 200.0)
}

fn default_min_size() -> Size {
    Size::new(100.0, 60.0)
}

fn default_max_size() -> Size {
    Size::new(800.0, 600.0)
}

/// A positioned visual element bound to a sensor path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub id: String,
    #[serde(rename = "type", default)]
    pub widget_type: WidgetType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default = "default_widget_size")]
    pub size: Size,
    /// Dotted path into `SensorData` (e.g. `cpu.usage`).
    #[serde(default)]
    pub sensor_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub appearance: Appearance,
    /// Alert condition ids attached to this widget.
    #[serde(default)]
    pub alerts: Vec<String>,
    #[serde(default = "default_min_size")]
    pub min_size: Size,
    #[serde(default = "default_max_size")]
    pub max_size: Size,
}

impl WidgetConfig {
    /// Create a widget with default styling at the origin.
    pub fn new(
        id: impl Into<String>,
        widget_type: WidgetType,
        title: impl Into<String>,
        sensor_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            widget_type,
            title: title.into(),
            position: Position::default(),
            size: default_widget_size(),
            sensor_path: sensor_path.into(),
            unit: None,
            appearance: Appearance::default(),
            alerts: Vec::new(),
            min_size: default_min_size(),
            max_size: default_max_size(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn sized(mut self, w: f64, h: f64) -> Self {
        self.size = Size::new(w, h);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_limits(mut self, min: Size, max: Size) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    /// Bounding box on the canvas.
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: WidgetPatch) {
        if let Some(widget_type) = patch.widget_type {
            self.widget_type = widget_type;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(sensor_path) = patch.sensor_path {
            self.sensor_path = sensor_path;
        }
        if let Some(unit) = patch.unit {
            self.unit = Some(unit);
        }
        if let Some(appearance) = patch.appearance {
            self.appearance = appearance;
        }
        if let Some(alerts) = patch.alerts {
            self.alerts = alerts;
        }
    }
}

/// Partial widget update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetPatch {
    #[serde(rename = "type")]
    pub widget_type: Option<WidgetType>,
    pub title: Option<String>,
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub sensor_path: Option<String>,
    pub unit: Option<String>,
    pub appearance: Option<Appearance>,
    pub alerts: Option<Vec<String>>,
}

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

fn default_theme() -> String {
    DEFAULT_THEME_ID.to_string()
}

/// Named collection of widgets plus grid/theme metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Unix milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Unix milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

impl DashboardLayout {
    /// Create an empty layout with a fresh id.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: new_id(),
            name: name.into(),
            description: description.into(),
            widgets: Vec::new(),
            grid_size: DEFAULT_GRID_SIZE,
            theme: default_theme(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The built-in monitoring layout.
    pub fn default_layout() -> Self {
        let now = now_ms();
        Self {
            id: DEFAULT_LAYOUT_ID.to_string(),
            name: "Default Layout".to_string(),
            description: "Default sensor monitoring layout".to_string(),
            widgets: default_widgets(),
            grid_size: DEFAULT_GRID_SIZE,
            theme: default_theme(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn widget(&self, id: &str) -> Option<&WidgetConfig> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn widget_mut(&mut self, id: &str) -> Option<&mut WidgetConfig> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    /// Append a widget, rejecting an id already present.
    pub fn add_widget(&mut self, widget: WidgetConfig) -> Result<()> {
        if self.widget(&widget.id).is_some() {
            return Err(CoreError::DuplicateWidget(widget.id));
        }
        self.widgets.push(widget);
        self.touch();
        Ok(())
    }

    /// Remove a widget; returns it if it existed.
    pub fn remove_widget(&mut self, id: &str) -> Option<WidgetConfig> {
        let index = self.widgets.iter().position(|w| w.id == id)?;
        let removed = self.widgets.remove(index);
        self.touch();
        Some(removed)
    }

    /// True if `bounds` overlaps any widget other than `exclude_id`.
    pub fn has_collision(&self, bounds: &Rect, exclude_id: Option<&str>) -> bool {
        self.widgets
            .iter()
            .filter(|w| Some(w.id.as_str()) != exclude_id)
            .any(|w| w.bounds().overlaps(bounds))
    }

    /// Snap a point to this layout's grid.
    pub fn snap_to_grid(&self, x: f64, y: f64) -> Position {
        snap_to_grid(x, y, self.grid_size)
    }

    pub fn set_grid_size(&mut self, size: f64) {
        self.grid_size = clamp_grid_size(size);
        self.touch();
    }

    /// True if no two widgets share an id.
    pub fn has_unique_widget_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.widgets.len());
        self.widgets.iter().all(|w| seen.insert(w.id.as_str()))
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = now_ms();
    }
}

fn gauge_appearance(colors: [&str; 3]) -> Appearance {
    Appearance {
        colors: colors.iter().map(|c| c.to_string()).collect(),
        typography: Typography::default(),
        borders: Borders {
            thickness: 2.0,
            style: "solid".to_string(),
            radius: 12.0,
        },
        chart_params: ChartParams {
            start_angle: Some(-90.0),
            end_angle: Some(270.0),
            stroke_width: Some(8.0),
            show_labels: Some(true),
            ..Default::default()
        },
    }
}

fn value_appearance() -> Appearance {
    Appearance {
        colors: vec![
            "#10b981".to_string(),
            "#f59e0b".to_string(),
            "#ef4444".to_string(),
        ],
        typography: Typography {
            font_size: 24.0,
            font_weight: "700".to_string(),
            color: "#1f2937".to_string(),
        },
        borders: Borders::default(),
        chart_params: ChartParams::default(),
    }
}

/// Widgets of the built-in layout.
fn default_widgets() -> Vec<WidgetConfig> {
    let gauge_limits = (Size::new(150.0, 150.0), Size::new(400.0, 400.0));
    let value_limits = (Size::new(120.0, 80.0), Size::new(300.0, 200.0));

    let mut memory_appearance = gauge_appearance(["#06b6d4", "#f59e0b", "#ef4444"]);
    memory_appearance.typography.font_size = 14.0;
    memory_appearance.typography.font_weight = "500".to_string();
    memory_appearance.borders = Borders::default();
    memory_appearance.chart_params = ChartParams {
        bar_thickness: Some(20.0),
        show_labels: Some(true),
        show_grid: Some(false),
        ..Default::default()
    };

    vec![
        WidgetConfig::new("cpu-usage", WidgetType::Gauge, "CPU Usage", "cpu.usage")
            .at(0.0, 0.0)
            .with_unit("%")
            .with_limits(gauge_limits.0, gauge_limits.1)
            .with_appearance(gauge_appearance(["#22c55e", "#f59e0b", "#ef4444"])),
        WidgetConfig::new("gpu-usage", WidgetType::Gauge, "GPU Usage", "gpu.usage")
            .at(220.0, 0.0)
            .with_unit("%")
            .with_limits(gauge_limits.0, gauge_limits.1)
            .with_appearance(gauge_appearance(["#3b82f6", "#8b5cf6", "#ef4444"])),
        WidgetConfig::new("memory-usage", WidgetType::Meter, "Memory Usage", "memory.usage")
            .at(0.0, 220.0)
            .sized(420.0, 80.0)
            .with_unit("%")
            .with_limits(Size::new(200.0, 60.0), Size::new(600.0, 120.0))
            .with_appearance(memory_appearance),
        WidgetConfig::new("cpu-temp", WidgetType::Simple, "CPU Temp", "cpu.temperature")
            .at(440.0, 0.0)
            .sized(180.0, 100.0)
            .with_unit("°C")
            .with_limits(value_limits.0, value_limits.1)
            .with_appearance(value_appearance()),
        WidgetConfig::new("gpu-temp", WidgetType::Simple, "GPU Temp", "gpu.temperature")
            .at(440.0, 120.0)
            .sized(180.0, 100.0)
            .with_unit("°C")
            .with_limits(value_limits.0, value_limits.1)
            .with_appearance(value_appearance()),
    ]
}
