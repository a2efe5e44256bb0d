//! Skill progress bars

use crate::svg::{escape_xml, normalize_color, Palette};
use crate::widgets::SkillsConfig;
use std::fmt::Write;

const PADDING: f64 = 20.0;
const TITLE_HEIGHT: f64 = 36.0;
const BAR_HEIGHT: f64 = 8.0;

/// Draw one labelled bar per skill, stacked evenly over the card height
pub fn render_skill_bars(config: &SkillsConfig) -> String {
    let palette = Palette::for_theme(&config.theme);
    let bar_color = config
        .bar_color
        .as_deref()
        .map(normalize_color)
        .unwrap_or_else(|| palette.bar.to_string());

    let width = f64::from(config.width);
    let height = f64::from(config.height);
    let header = if config.title.is_some() { TITLE_HEIGHT } else { 0.0 };
    let rows = config.skills.len().max(1) as f64;
    let row_height = ((height - header - PADDING * 2.0) / rows).max(BAR_HEIGHT * 2.0);
    let track_width = (width - PADDING * 2.0).max(0.0);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img">"#,
        w = config.width,
        h = config.height
    );
    let _ = write!(
        svg,
        r#"<rect width="100%" height="100%" rx="6" fill="{}"/>"#,
        palette.background
    );

    if let Some(title) = &config.title {
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y:.1}" fill="{fill}" font-family="Segoe UI, Ubuntu, sans-serif" font-size="16" font-weight="600">{text}</text>"#,
            x = PADDING,
            y = PADDING + 8.0,
            fill = palette.text,
            text = escape_xml(title)
        );
    }

    for (index, skill) in config.skills.iter().enumerate() {
        let top = PADDING + header + row_height * index as f64;
        let label_y = top + 12.0;
        let bar_y = top + 20.0;
        let level = f64::from(skill.level.min(100));
        let filled = track_width * level / 100.0;

        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y:.1}" fill="{fill}" font-family="Segoe UI, Ubuntu, sans-serif" font-size="12">{name}</text>"#,
            x = PADDING,
            y = label_y,
            fill = palette.text,
            name = escape_xml(skill.name.trim())
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{y:.1}" fill="{fill}" font-family="Segoe UI, Ubuntu, sans-serif" font-size="12" text-anchor="end">{level}%</text>"#,
            x = width - PADDING,
            y = label_y,
            fill = palette.text,
            level = skill.level
        );
        let _ = write!(
            svg,
            r#"<rect x="{x}" y="{y:.1}" width="{w:.1}" height="{h}" rx="4" fill="{fill}"/>"#,
            x = PADDING,
            y = bar_y,
            w = track_width,
            h = BAR_HEIGHT,
            fill = palette.track
        );

        if config.animated {
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{y:.1}" width="0" height="{h}" rx="4" fill="{fill}"><animate attributeName="width" from="0" to="{w:.1}" dur="1s" begin="{delay:.1}s" fill="freeze"/></rect>"#,
                x = PADDING,
                y = bar_y,
                h = BAR_HEIGHT,
                fill = bar_color,
                w = filled,
                delay = index as f64 * 0.15
            );
        } else {
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{y:.1}" width="{w:.1}" height="{h}" rx="4" fill="{fill}"/>"#,
                x = PADDING,
                y = bar_y,
                w = filled,
                h = BAR_HEIGHT,
                fill = bar_color
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Skill;

    #[test]
    fn test_renders_one_bar_per_skill() {
        let config = SkillsConfig::new(vec![Skill::new("TypeScript", 85), Skill::new("Rust", 70)]);
        let svg = render_skill_bars(&config);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"width="400" height="300""#));
        assert!(svg.contains(">TypeScript<"));
        assert!(svg.contains(">85%<"));
        assert_eq!(svg.matches("<animate ").count(), 2);
    }

    #[test]
    fn test_static_bar_width_matches_level() {
        let mut config = SkillsConfig::new(vec![Skill::new("Go", 50)]);
        config.animated = false;
        config.bar_color = Some("FF0000".to_string());
        let svg = render_skill_bars(&config);

        // track is 400 - 2 * 20 = 360 wide, half of it filled
        assert!(svg.contains(r##"width="180.0" height="8" rx="4" fill="#ff0000""##));
        assert!(!svg.contains("<animate"));
    }

    #[test]
    fn test_escapes_names_and_title() {
        let mut config = SkillsConfig::new(vec![Skill::new("C & C++", 40)]);
        config.title = Some("<Skills>".to_string());
        let svg = render_skill_bars(&config);

        assert!(svg.contains("C &amp; C++"));
        assert!(svg.contains("&lt;Skills&gt;"));
    }
}
