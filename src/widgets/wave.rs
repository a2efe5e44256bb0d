//! Wave banner drawn from a color list

use crate::error::{Result, WidgetError};
use crate::svg;
use crate::widgets::{EndpointUrls, ImageWidget, SvgWidget, WidgetConfig, WidgetKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn default_colors() -> Vec<String> {
    vec!["#6366f1".to_string(), "#8b5cf6".to_string(), "#ec4899".to_string()]
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    140
}

fn default_waves() -> u8 {
    3
}

fn default_amplitude() -> u32 {
    18
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

fn default_true() -> bool {
    true
}

/// Where the banner sits in the README
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl WaveAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaveAlign::Left => "left",
            WaveAlign::Center => "center",
            WaveAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// One color per wave layer, back to front
    #[serde(default = "default_colors")]
    pub colors: Vec<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_waves")]
    pub waves: u8,
    #[serde(default = "default_amplitude")]
    pub amplitude: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_true")]
    pub animated: bool,
    /// Markdown placement; not part of the image
    #[serde(default)]
    pub align: WaveAlign,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            colors: default_colors(),
            width: default_width(),
            height: default_height(),
            waves: default_waves(),
            amplitude: default_amplitude(),
            text: None,
            text_color: default_text_color(),
            animated: true,
            align: WaveAlign::default(),
        }
    }
}

impl WaveConfig {
    /// Color for layer `index`, cycling through the palette; `None` when it is empty
    pub fn layer_color(&self, index: usize) -> Option<&str> {
        if self.colors.is_empty() {
            return None;
        }
        Some(&self.colors[index % self.colors.len()])
    }
}

impl WidgetConfig for WaveConfig {
    const KIND: WidgetKind = WidgetKind::Wave;

    fn hash_fields(&self) -> Value {
        let mut fields = json!({
            "colors": self.colors.iter().map(|c| svg::normalize_color(c)).collect::<Vec<_>>(),
            "width": self.width,
            "height": self.height,
            "waves": self.waves,
            "amplitude": self.amplitude,
            "text": self.text,
            "animated": self.animated,
        });
        // the caption color only shows up when there is a caption
        if self.text.is_some() {
            fields["text_color"] = json!(svg::normalize_color(&self.text_color));
        }
        fields
    }

    fn validate(&self) -> Result<()> {
        if self.colors.is_empty() {
            return Err(WidgetError::Validation("add at least one color".to_string()));
        }
        for color in &self.colors {
            svg::validate_color(color)?;
        }
        svg::validate_color(&self.text_color)?;
        if self.width == 0 || self.height == 0 {
            return Err(WidgetError::Validation(
                "width and height must be greater than 0".to_string(),
            ));
        }
        if !(1..=8).contains(&self.waves) {
            return Err(WidgetError::Validation(format!(
                "waves must be between 1 and 8, got {}",
                self.waves
            )));
        }
        if self.amplitude.saturating_mul(2) > self.height {
            return Err(WidgetError::Validation(format!(
                "amplitude {} does not fit in height {}",
                self.amplitude, self.height
            )));
        }
        Ok(())
    }
}

impl ImageWidget for WaveConfig {
    fn image_url(&self, urls: &EndpointUrls) -> String {
        let colors = self
            .colors
            .iter()
            .map(|c| c.trim_start_matches('#').to_string())
            .collect::<Vec<_>>()
            .join(",");
        let mut params = vec![
            ("colors", colors),
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("waves", self.waves.to_string()),
            ("amplitude", self.amplitude.to_string()),
        ];
        if let Some(text) = &self.text {
            params.push(("text", text.clone()));
            params.push(("text_color", self.text_color.trim_start_matches('#').to_string()));
        }
        if !self.animated {
            params.push(("animated", "false".to_string()));
        }
        EndpointUrls::build(&urls.widgets, "/api/wave", &params)
    }
}

impl SvgWidget for WaveConfig {
    fn render_svg(&self) -> String {
        svg::wave::render_wave(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::config_hash;

    #[test]
    fn test_default_is_valid() {
        assert!(WaveConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = WaveConfig::default();
        config.colors.clear();
        assert!(config.validate().is_err());

        let mut config = WaveConfig::default();
        config.colors = vec!["#12345".to_string()];
        assert!(config.validate().is_err());

        let mut config = WaveConfig::default();
        config.amplitude = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layer_color_cycles() {
        let config = WaveConfig {
            colors: vec!["#000000".to_string(), "#ffffff".to_string()],
            ..Default::default()
        };
        assert_eq!(config.layer_color(0), Some("#000000"));
        assert_eq!(config.layer_color(3), Some("#ffffff"));
    }

    #[test]
    fn test_empty_palette_renders_without_layers() {
        let config = WaveConfig {
            colors: vec![],
            ..Default::default()
        };
        assert_eq!(config.layer_color(0), None);

        let svg = config.render_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_caption_color_only_hashed_with_caption() {
        let plain = WaveConfig::default();
        let recolored = WaveConfig {
            text_color: "#000000".to_string(),
            ..Default::default()
        };
        assert_eq!(config_hash(&plain), config_hash(&recolored));
        assert_eq!(plain.render_svg(), recolored.render_svg());

        let captioned = WaveConfig {
            text: Some("Hi".to_string()),
            ..plain.clone()
        };
        let recaptioned = WaveConfig {
            text: Some("Hi".to_string()),
            ..recolored
        };
        assert_ne!(config_hash(&captioned), config_hash(&recaptioned));
    }

    #[test]
    fn test_color_spelling_does_not_change_hash() {
        let upper = WaveConfig {
            colors: vec!["#0EA5E9".to_string(), "22d3ee".to_string()],
            ..Default::default()
        };
        let lower = WaveConfig {
            colors: vec!["#0ea5e9".to_string(), "#22d3ee".to_string()],
            ..Default::default()
        };
        assert_eq!(config_hash(&upper), config_hash(&lower));
        assert_eq!(upper.render_svg(), lower.render_svg());
    }

    #[test]
    fn test_wave_url() {
        let url = WaveConfig::default().image_url(&EndpointUrls::default());
        assert!(url.starts_with("http://127.0.0.1:8080/api/wave?colors=6366f1%2C8b5cf6%2Cec4899"));
    }
}
