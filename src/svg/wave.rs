//! Layered sine-wave banner

use crate::svg::{escape_xml, normalize_color};
use crate::widgets::WaveConfig;
use std::f64::consts::PI;
use std::fmt::Write;

const SAMPLES: usize = 48;

/// Outline of one wave layer as an SVG path, closed along the bottom edge
pub fn wave_path(width: f64, height: f64, baseline: f64, amplitude: f64, frequency: f64, phase: f64) -> String {
    let mut path = format!("M0,{:.1}", height);
    for step in 0..=SAMPLES {
        let x = width * step as f64 / SAMPLES as f64;
        let y = baseline + amplitude * (2.0 * PI * frequency * x / width + phase).sin();
        let _ = write!(path, " L{:.1},{:.1}", x, y);
    }
    let _ = write!(path, " L{:.1},{:.1} Z", width, height);
    path
}

/// Draw `waves` layers, back to front, with an optional centered caption
pub fn render_wave(config: &WaveConfig) -> String {
    let width = f64::from(config.width);
    let height = f64::from(config.height);
    let amplitude = f64::from(config.amplitude);
    let layers = usize::from(config.waves.max(1));

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" preserveAspectRatio="none">"#,
        w = config.width,
        h = config.height
    );

    for layer in 0..layers {
        let depth = layer as f64 / layers as f64;
        let baseline = height * (0.35 + 0.4 * depth);
        let frequency = 1.0 + 0.5 * layer as f64;
        let phase = layer as f64 * PI / 3.0;
        let opacity = 0.5 + 0.5 * (layer + 1) as f64 / layers as f64;
        let Some(color) = config.layer_color(layer).map(normalize_color) else {
            break;
        };

        let _ = write!(
            svg,
            r#"<path d="{d}" fill="{fill}" fill-opacity="{opacity:.2}">"#,
            d = wave_path(width, height, baseline, amplitude, frequency, phase),
            fill = color,
            opacity = opacity
        );
        if config.animated {
            let _ = write!(
                svg,
                r#"<animateTransform attributeName="transform" type="translate" values="0,0;{shift:.1},0;0,0" dur="{dur}s" repeatCount="indefinite"/>"#,
                shift = -(width / 40.0) * (layer + 1) as f64,
                dur = 6 + 2 * layer
            );
        }
        svg.push_str("</path>");
    }

    if let Some(text) = &config.text {
        let _ = write!(
            svg,
            r#"<text x="50%" y="{y:.1}" fill="{fill}" font-family="Segoe UI, Ubuntu, sans-serif" font-size="{size:.0}" font-weight="700" text-anchor="middle" dominant-baseline="middle">{text}</text>"#,
            y = height * 0.3,
            fill = normalize_color(&config.text_color),
            size = (height * 0.22).clamp(12.0, 48.0),
            text = escape_xml(text)
        );
    }

    svg.push_str("</svg>");
    svg
}
