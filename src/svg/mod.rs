//! Parametric SVG drawing for locally rendered widgets

pub mod progress;
pub mod wave;

use crate::error::{Result, WidgetError};

/// Colors used by the skill-bar renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub track: &'static str,
    pub bar: &'static str,
}

impl Palette {
    /// Palette for a named theme, falling back to `default`
    pub fn for_theme(theme: &str) -> Self {
        match theme {
            "dark" => Palette {
                background: "#151515",
                text: "#ffffff",
                track: "#2d2d2d",
                bar: "#79ff97",
            },
            "radical" => Palette {
                background: "#141321",
                text: "#a9fef7",
                track: "#2a2940",
                bar: "#fe428e",
            },
            "tokyonight" => Palette {
                background: "#1a1b27",
                text: "#38bdae",
                track: "#2a2c3e",
                bar: "#70a5fd",
            },
            _ => Palette {
                background: "#fffefe",
                text: "#434d58",
                track: "#e4e2e2",
                bar: "#2f80ed",
            },
        }
    }
}

/// Accept `#rgb`, `#rrggbb`, with or without the leading `#`
pub fn validate_color(color: &str) -> Result<()> {
    let hex = color.trim().trim_start_matches('#');
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(WidgetError::Validation(format!(
            "'{}' is not a hex color",
            color
        )))
    }
}

/// Lowercase `#`-prefixed form of a color that passed [`validate_color`]
pub fn normalize_color(color: &str) -> String {
    format!("#{}", color.trim().trim_start_matches('#').to_lowercase())
}

/// Escape text for use inside SVG elements and attributes
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("6366F1").is_ok());
        assert!(validate_color("#12345").is_err());
        assert!(validate_color("red").is_err());
        assert!(validate_color("").is_err());
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("6366F1"), "#6366f1");
        assert_eq!(normalize_color("#ABC"), "#abc");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("C & <C++>"), "C &amp; &lt;C++&gt;");
        assert_eq!(escape_xml("\"hi\""), "&quot;hi&quot;");
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        assert_eq!(Palette::for_theme("nope"), Palette::for_theme("default"));
        assert_ne!(Palette::for_theme("dark"), Palette::for_theme("default"));
    }
}
