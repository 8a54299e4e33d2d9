//! Built-in color palettes.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub background: String,
    pub surface: String,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub text: String,
    pub text_muted: String,
    pub border: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub is_dark: bool,
    pub colors: ThemeColors,
}

// id, name, dark, [background, surface, primary, secondary, accent, text,
// textMuted, border, error, warning, success]
const PALETTES: &[(&str, &str, bool, [&str; 11])] = &[
    (
        "dark",
        "Dark Mode",
        true,
        [
            "#0f0f0f", "#1a1a1a", "#3b82f6", "#64748b", "#06b6d4", "#f8fafc", "#cbd5e1",
            "#374151", "#ef4444", "#f59e0b", "#10b981",
        ],
    ),
    (
        "light",
        "Light Mode",
        false,
        [
            "#ffffff", "#f8fafc", "#3b82f6", "#64748b", "#06b6d4", "#1e293b", "#64748b",
            "#e2e8f0", "#ef4444", "#f59e0b", "#10b981",
        ],
    ),
    (
        "gaming",
        "Gaming",
        true,
        [
            "#0a0a0a", "#1a1a1a", "#00ff88", "#ff0088", "#00ffff", "#ffffff", "#cccccc",
            "#333333", "#ff0040", "#ffaa00", "#00ff88",
        ],
    ),
    (
        "rgb",
        "RGB",
        true,
        [
            "#000000", "#111111", "#ff0000", "#00ff00", "#0000ff", "#ffffff", "#aaaaaa",
            "#444444", "#ff4444", "#ffaa44", "#44ff44",
        ],
    ),
    (
        "minimal",
        "Minimal",
        false,
        [
            "#fafafa", "#ffffff", "#000000", "#666666", "#333333", "#000000", "#666666",
            "#e0e0e0", "#cc0000", "#ff8800", "#008800",
        ],
    ),
];

fn build(entry: &(&str, &str, bool, [&str; 11])) -> Theme {
    let (id, name, is_dark, c) = entry;
    Theme {
        id: id.to_string(),
        name: name.to_string(),
        is_dark: *is_dark,
        colors: ThemeColors {
            background: c[0].to_string(),
            surface: c[1].to_string(),
            primary: c[2].to_string(),
            secondary: c[3].to_string(),
            accent: c[4].to_string(),
            text: c[5].to_string(),
            text_muted: c[6].to_string(),
            border: c[7].to_string(),
            error: c[8].to_string(),
            warning: c[9].to_string(),
            success: c[10].to_string(),
        },
    }
}

pub fn builtin_themes() -> Vec<Theme> {
    PALETTES.iter().map(build).collect()
}

pub fn is_known_theme(id: &str) -> bool {
    PALETTES.iter().any(|(known, ..)| *known == id)
}

/// Look up a palette; unknown ids fall back to `dark`.
pub fn theme(id: &str) -> Theme {
    PALETTES
        .iter()
        .find(|(known, ..)| *known == id)
        .map(build)
        .unwrap_or_else(|| build(&PALETTES[0]))
}
