//! Dashboard layout store.
//!
//! Holds the current layout, the saved-layouts list and the editor
//! selection. Every mutation is mirrored to storage before the lock is
//! released, so storage always reflects the last write.

use crate::error::StoreResult;
use crate::storage::{
    load_json, save_json, KeyValueStore, LAYOUT_KEY, LEGACY_CURRENT_LAYOUT_KEY,
    LEGACY_LAYOUTS_KEY, SAVED_LAYOUTS_KEY,
};
use parking_lot::RwLock;
use sensecanvas_core::{
    clamp_grid_size, new_id, now_ms, DashboardLayout, Position, Rect, Size, WidgetConfig,
    WidgetPatch, WidgetType, DEFAULT_GRID_SIZE, DEFAULT_THEME_ID,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const IMPORTED_LAYOUT_NAME: &str = "Imported Layout";

struct LayoutState {
    current: DashboardLayout,
    saved: Vec<DashboardLayout>,
    selected: Vec<String>,
    edit_mode: bool,
}

/// Current layout plus saved layouts, persisted to a [`KeyValueStore`].
pub struct LayoutStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<LayoutState>,
}

impl LayoutStore {
    /// Store holding the default layout; nothing is read from storage.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: RwLock::new(LayoutState {
                current: DashboardLayout::default_layout(),
                saved: Vec::new(),
                selected: Vec::new(),
                edit_mode: false,
            }),
        }
    }

    /// Create and load from storage.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);
        store.init();
        store
    }

    /// Load the current and saved layouts, falling back to the legacy keys
    /// and then to the default layout.
    pub fn init(&self) {
        let storage = self.storage.as_ref();

        let current = load_json::<DashboardLayout>(storage, LAYOUT_KEY)
            .or_else(|| load_json(storage, LEGACY_CURRENT_LAYOUT_KEY))
            .filter(|layout| {
                let unique = layout.has_unique_widget_ids();
                if !unique {
                    warn!(layout_id = %layout.id, "Stored layout has duplicate widget ids, ignoring");
                }
                unique
            });

        let saved = load_json::<Vec<DashboardLayout>>(storage, SAVED_LAYOUTS_KEY)
            .or_else(|| load_json(storage, LEGACY_LAYOUTS_KEY))
            .unwrap_or_default();

        let mut state = self.state.write();
        match current {
            Some(layout) => {
                info!(
                    layout_id = %layout.id,
                    widgets = layout.widgets.len(),
                    saved = saved.len(),
                    "Loaded layout from storage"
                );
                state.current = layout;
            }
            None => {
                info!(saved = saved.len(), "No stored layout, using default");
                state.current = DashboardLayout::default_layout();
            }
        }
        state.saved = saved;
        state.selected.clear();
    }

    pub fn current(&self) -> DashboardLayout {
        self.state.read().current.clone()
    }

    pub fn widgets(&self) -> Vec<WidgetConfig> {
        self.state.read().current.widgets.clone()
    }

    pub fn widget(&self, id: &str) -> Option<WidgetConfig> {
        self.state.read().current.widget(id).cloned()
    }

    pub fn saved_layouts(&self) -> Vec<DashboardLayout> {
        self.state.read().saved.clone()
    }

    /// Run `f` on the current layout and persist it.
    fn mutate_current<R>(&self, f: impl FnOnce(&mut DashboardLayout) -> R) -> R {
        let mut state = self.state.write();
        let result = f(&mut state.current);
        save_json(self.storage.as_ref(), LAYOUT_KEY, &state.current);
        result
    }

    fn persist_saved(&self, saved: &[DashboardLayout]) {
        save_json(self.storage.as_ref(), SAVED_LAYOUTS_KEY, saved);
    }

    // ---- widgets ----

    /// Append a widget. Fails if the id is already in the layout.
    pub fn add_widget(&self, widget: WidgetConfig) -> StoreResult<()> {
        let id = widget.id.clone();
        self.mutate_current(|layout| layout.add_widget(widget))?;
        debug!(widget_id = %id, "Widget added");
        Ok(())
    }

    /// Apply `patch` to a widget. Returns false if no widget has this id.
    pub fn update_widget(&self, id: &str, patch: WidgetPatch) -> bool {
        self.mutate_current(|layout| match layout.widget_mut(id) {
            Some(widget) => {
                widget.apply(patch);
                layout.touch();
                true
            }
            None => false,
        })
    }

    /// Move/resize a widget, creating a default one when it does not exist.
    ///
    /// Returns true if a widget was created.
    pub fn upsert_widget_position(&self, id: &str, position: Position, size: Size) -> bool {
        self.mutate_current(|layout| {
            let created = match layout.widget_mut(id) {
                Some(widget) => {
                    widget.position = position;
                    widget.size = size;
                    false
                }
                None => {
                    let widget = WidgetConfig::new(id, WidgetType::default(), "", "")
                        .at(position.x, position.y)
                        .sized(size.w, size.h);
                    layout.widgets.push(widget);
                    true
                }
            };
            layout.touch();
            created
        })
    }

    /// Remove a widget and drop it from the selection.
    pub fn remove_widget(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let removed = state.current.remove_widget(id).is_some();
        if removed {
            state.selected.retain(|s| s != id);
            save_json(self.storage.as_ref(), LAYOUT_KEY, &state.current);
            debug!(widget_id = %id, "Widget removed");
        }
        removed
    }

    /// True if `bounds` overlaps any widget other than `exclude_id`.
    pub fn has_collision(&self, bounds: &Rect, exclude_id: Option<&str>) -> bool {
        self.state.read().current.has_collision(bounds, exclude_id)
    }

    /// Snap to the current layout's grid.
    pub fn snap_to_grid(&self, x: f64, y: f64) -> Position {
        self.state.read().current.snap_to_grid(x, y)
    }

    /// Set the grid size, clamped to `[10, 50]`. Returns the applied size.
    pub fn set_grid_size(&self, size: f64) -> f64 {
        self.mutate_current(|layout| {
            layout.set_grid_size(size);
            layout.grid_size
        })
    }

    pub fn set_theme(&self, theme_id: &str) {
        self.mutate_current(|layout| {
            layout.theme = theme_id.to_string();
            layout.touch();
        });
    }

    // ---- saved layouts ----

    /// Snapshot the current layout under a new id. Returns the new id.
    pub fn save_layout(&self, name: &str) -> String {
        let mut state = self.state.write();
        let now = now_ms();
        let snapshot = DashboardLayout {
            id: new_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
            ..state.current.clone()
        };
        let id = snapshot.id.clone();
        state.saved.push(snapshot);
        self.persist_saved(&state.saved);
        info!(layout_id = %id, name, "Layout saved");
        id
    }

    /// Make a saved layout current. Returns false for an unknown id.
    pub fn load_layout(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let Some(layout) = state.saved.iter().find(|l| l.id == id).cloned() else {
            warn!(layout_id = %id, "Saved layout not found");
            return false;
        };
        state.current = layout;
        state.selected.clear();
        save_json(self.storage.as_ref(), LAYOUT_KEY, &state.current);
        info!(layout_id = %id, "Layout loaded");
        true
    }

    pub fn delete_layout(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let before = state.saved.len();
        state.saved.retain(|l| l.id != id);
        let deleted = state.saved.len() != before;
        if deleted {
            self.persist_saved(&state.saved);
            info!(layout_id = %id, "Saved layout deleted");
        }
        deleted
    }

    /// Start a new empty layout, keeping the current theme. The new layout
    /// becomes current and is added to the saved list.
    pub fn create_layout(&self, name: &str, description: &str) -> DashboardLayout {
        let mut state = self.state.write();
        let mut layout = DashboardLayout::new(name, description);
        layout.theme = state.current.theme.clone();

        state.current = layout.clone();
        state.selected.clear();
        state.saved.push(layout.clone());
        save_json(self.storage.as_ref(), LAYOUT_KEY, &state.current);
        self.persist_saved(&state.saved);
        info!(layout_id = %layout.id, name, "Layout created");
        layout
    }

    /// Back to the default layout, keeping the current theme.
    pub fn reset_layout(&self) {
        let mut state = self.state.write();
        let mut layout = DashboardLayout::default_layout();
        layout.theme = state.current.theme.clone();
        state.current = layout;
        state.selected.clear();
        save_json(self.storage.as_ref(), LAYOUT_KEY, &state.current);
        info!("Layout reset to default");
    }

    // ---- import / export ----

    /// Pretty JSON of the current layout, or of a saved one by id.
    pub fn export_layout(&self, id: Option<&str>) -> Option<String> {
        let state = self.state.read();
        let layout = match id {
            Some(id) => state.saved.iter().find(|l| l.id == id)?,
            None => &state.current,
        };
        match serde_json::to_string_pretty(layout) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "Failed to export layout");
                None
            }
        }
    }

    /// Replace the current layout from JSON text.
    ///
    /// Requires an object with a `widgets` array of valid widgets with
    /// unique ids. The imported layout gets a fresh id and timestamps. On
    /// any failure returns false and the current layout is untouched.
    pub fn import_layout(&self, json: &str) -> bool {
        let layout = match parse_import(json) {
            Ok(layout) => layout,
            Err(reason) => {
                warn!(%reason, "Rejected layout import");
                return false;
            }
        };

        let mut state = self.state.write();
        info!(
            layout_id = %layout.id,
            widgets = layout.widgets.len(),
            "Layout imported"
        );
        state.current = layout;
        state.selected.clear();
        save_json(self.storage.as_ref(), LAYOUT_KEY, &state.current);
        true
    }

    // ---- editor state ----

    /// Select a widget. With `multi` the id is toggled in the selection,
    /// otherwise it replaces the selection.
    pub fn select_widget(&self, id: &str, multi: bool) {
        let mut state = self.state.write();
        if multi {
            if let Some(index) = state.selected.iter().position(|s| s == id) {
                state.selected.remove(index);
            } else {
                state.selected.push(id.to_string());
            }
        } else {
            state.selected = vec![id.to_string()];
        }
    }

    pub fn clear_selection(&self) {
        self.state.write().selected.clear();
    }

    pub fn selected(&self) -> Vec<String> {
        self.state.read().selected.clone()
    }

    /// Flip edit mode; the selection is cleared. Returns the new mode.
    pub fn toggle_edit_mode(&self) -> bool {
        let mut state = self.state.write();
        state.edit_mode = !state.edit_mode;
        state.selected.clear();
        state.edit_mode
    }

    pub fn is_edit_mode(&self) -> bool {
        self.state.read().edit_mode
    }
}

fn parse_import(json: &str) -> Result<DashboardLayout, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
    let object = value
        .as_object()
        .ok_or_else(|| "expected a JSON object".to_string())?;
    let widgets_value = object
        .get("widgets")
        .filter(|w| w.is_array())
        .cloned()
        .ok_or_else(|| "missing widgets array".to_string())?;
    let widgets: Vec<WidgetConfig> =
        serde_json::from_value(widgets_value).map_err(|e| format!("invalid widget: {e}"))?;

    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let grid_size = object
        .get("gridSize")
        .and_then(Value::as_f64)
        .filter(|g| *g > 0.0)
        .map(clamp_grid_size)
        .unwrap_or(DEFAULT_GRID_SIZE);

    let now = now_ms();
    let layout = DashboardLayout {
        id: new_id(),
        name: text("name").unwrap_or_else(|| IMPORTED_LAYOUT_NAME.to_string()),
        description: text("description").unwrap_or_default(),
        widgets,
        grid_size,
        theme: text("theme").unwrap_or_else(|| DEFAULT_THEME_ID.to_string()),
        created_at: now,
        updated_at: now,
    };

    if !layout.has_unique_widget_ids() {
        return Err("duplicate widget ids".to_string());
    }
    Ok(layout)
}
