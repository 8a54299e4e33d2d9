//! Layout suggestions.
//!
//! A fixed catalog; there is no model behind it. Suggestions are filtered
//! to those whose widgets all use an available widget type.

use sensecanvas_core::{Appearance, WidgetConfig, WidgetType};

use crate::types::LayoutSuggestion;

fn colored(colors: [&str; 3]) -> Appearance {
    Appearance {
        colors: colors.iter().map(|c| c.to_string()).collect(),
        ..Default::default()
    }
}

fn catalog() -> Vec<LayoutSuggestion> {
    vec![
        LayoutSuggestion {
            id: "gaming-dashboard".to_string(),
            name: "Gaming Performance".to_string(),
            description: "Optimized layout for gaming performance monitoring".to_string(),
            reasoning: "Prioritizes CPU, GPU, and memory usage with large gauges for quick \
                        visibility during gaming sessions."
                .to_string(),
            confidence: 0.92,
            widgets: vec![
                WidgetConfig::new("cpu-gauge", WidgetType::Gauge, "CPU Usage", "cpu.usage")
                    .at(20.0, 20.0)
                    .sized(200.0, 200.0)
                    .with_unit("%")
                    .with_appearance(colored(["#22c55e", "#f59e0b", "#ef4444"])),
                WidgetConfig::new("gpu-gauge", WidgetType::Gauge, "GPU Usage", "gpu.usage")
                    .at(240.0, 20.0)
                    .sized(200.0, 200.0)
                    .with_unit("%")
                    .with_appearance(colored(["#3b82f6", "#8b5cf6", "#ef4444"])),
                WidgetConfig::new("memory-bar", WidgetType::Meter, "Memory Usage", "memory.usage")
                    .at(20.0, 240.0)
                    .sized(420.0, 80.0)
                    .with_unit("%")
                    .with_appearance(colored(["#06b6d4", "#f59e0b", "#ef4444"])),
            ],
        },
        LayoutSuggestion {
            id: "minimal-overview".to_string(),
            name: "Minimal Overview".to_string(),
            description: "Clean, minimal layout focusing on key metrics".to_string(),
            reasoning: "Simple text-based widgets for users who prefer clean, \
                        distraction-free monitoring."
                .to_string(),
            confidence: 0.85,
            widgets: vec![
                WidgetConfig::new("cpu-simple", WidgetType::Simple, "CPU", "cpu.usage")
                    .at(20.0, 20.0)
                    .sized(150.0, 100.0)
                    .with_unit("%"),
                WidgetConfig::new("gpu-simple", WidgetType::Simple, "GPU", "gpu.usage")
                    .at(190.0, 20.0)
                    .sized(150.0, 100.0)
                    .with_unit("%"),
                WidgetConfig::new("memory-simple", WidgetType::Simple, "Memory", "memory.usage")
                    .at(360.0, 20.0)
                    .sized(150.0, 100.0)
                    .with_unit("%"),
            ],
        },
        LayoutSuggestion {
            id: "detailed-monitoring".to_string(),
            name: "Detailed Monitoring".to_string(),
            description: "Comprehensive layout with detailed metrics and temperatures"
                .to_string(),
            reasoning: "Includes temperature monitoring and detailed system information for \
                        power users and system administrators."
                .to_string(),
            confidence: 0.88,
            widgets: vec![
                WidgetConfig::new("cpu-detailed", WidgetType::Gauge, "CPU Usage", "cpu.usage")
                    .at(20.0, 20.0)
                    .sized(180.0, 180.0)
                    .with_unit("%"),
                WidgetConfig::new("cpu-temp", WidgetType::Simple, "CPU Temp", "cpu.temperature")
                    .at(220.0, 20.0)
                    .sized(140.0, 80.0)
                    .with_unit("°C"),
                WidgetConfig::new("gpu-detailed", WidgetType::Gauge, "GPU Usage", "gpu.usage")
                    .at(380.0, 20.0)
                    .sized(180.0, 180.0)
                    .with_unit("%"),
                WidgetConfig::new("gpu-temp", WidgetType::Simple, "GPU Temp", "gpu.temperature")
                    .at(220.0, 120.0)
                    .sized(140.0, 80.0)
                    .with_unit("°C"),
            ],
        },
    ]
}

/// Catalog entries usable with `available` widget types. An empty list
/// means every type is available.
pub fn suggest_layouts(available: &[WidgetType]) -> Vec<LayoutSuggestion> {
    let suggestions = catalog();
    if available.is_empty() {
        return suggestions;
    }
    suggestions
        .into_iter()
        .filter(|s| s.widgets.iter().all(|w| available.contains(&w.widget_type)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_returns_catalog() {
        let ids: Vec<String> = suggest_layouts(&[]).into_iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec!["gaming-dashboard", "minimal-overview", "detailed-monitoring"]
        );
    }

    #[test]
    fn test_filter_by_available_types() {
        let simple_only = suggest_layouts(&[WidgetType::Simple]);
        assert_eq!(simple_only.len(), 1);
        assert_eq!(simple_only[0].id, "minimal-overview");

        let gauges = suggest_layouts(&[WidgetType::Gauge, WidgetType::Simple]);
        let ids: Vec<&str> = gauges.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["minimal-overview", "detailed-monitoring"]);

        assert!(suggest_layouts(&[WidgetType::KpiCard]).is_empty());
    }

    #[test]
    fn test_catalog_widget_ids_unique_per_suggestion() {
        for suggestion in catalog() {
            let mut ids: Vec<&str> = suggestion.widgets.iter().map(|w| w.id.as_str()).collect();
            let count = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), count, "{}", suggestion.id);
        }
    }
}
