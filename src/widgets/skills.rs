//! Animated skill progress bars

use crate::error::{Result, WidgetError};
use crate::svg;
use crate::widgets::{EndpointUrls, ImageWidget, SvgWidget, WidgetConfig, WidgetKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One labelled bar, level in percent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: u8,
}

impl Skill {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    /// Wire form used in the `skills` query parameter
    pub fn encode(&self) -> String {
        format!("{}:{}", self.name.trim(), self.level)
    }

    /// Parse `Name:level`
    pub fn decode(raw: &str) -> Result<Self> {
        let (name, level) = raw.rsplit_once(':').ok_or_else(|| {
            WidgetError::Validation(format!("skill '{}' is not in name:level form", raw))
        })?;
        let level = level.trim().parse::<u8>().map_err(|_| {
            WidgetError::Validation(format!("skill '{}' has a non-numeric level", raw))
        })?;
        let skill = Skill::new(name.trim(), level);
        skill.validate()?;
        Ok(skill)
    }

    fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(WidgetError::Validation("skill name is required".to_string()));
        }
        if name.contains([',', ':']) {
            return Err(WidgetError::Validation(format!(
                "skill name '{}' may not contain ',' or ':'",
                name
            )));
        }
        if self.level > 100 {
            return Err(WidgetError::Validation(format!(
                "skill '{}' level {} is above 100",
                name, self.level
            )));
        }
        Ok(())
    }
}

fn default_width() -> u32 {
    400
}

fn default_height() -> u32 {
    300
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

/// Skill bars card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillsConfig {
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub animated: bool,
    /// Hex bar color overriding the theme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl SkillsConfig {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self {
            skills,
            width: default_width(),
            height: default_height(),
            theme: default_theme(),
            animated: true,
            bar_color: None,
            title: None,
            alt_text: None,
        }
    }

    /// Rebuild a config from the skills endpoint's query parameters
    pub fn from_query(
        skills: &str,
        width: Option<u32>,
        height: Option<u32>,
        theme: Option<String>,
    ) -> Result<Self> {
        let skills = skills
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Skill::decode)
            .collect::<Result<Vec<_>>>()?;

        let mut config = SkillsConfig::new(skills);
        config.width = width.unwrap_or(config.width);
        config.height = height.unwrap_or(config.height);
        if let Some(theme) = theme {
            config.theme = theme;
        }
        Ok(config)
    }

    fn encoded_skills(&self) -> String {
        self.skills
            .iter()
            .map(Skill::encode)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl WidgetConfig for SkillsConfig {
    const KIND: WidgetKind = WidgetKind::Skills;

    fn hash_fields(&self) -> Value {
        json!({
            "skills": self.skills.iter().map(Skill::encode).collect::<Vec<_>>(),
            "width": self.width,
            "height": self.height,
            "theme": self.theme,
            "animated": self.animated,
            "bar_color": self.bar_color,
            "title": self.title,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.skills.is_empty() {
            return Err(WidgetError::Validation("add at least one skill".to_string()));
        }
        for skill in &self.skills {
            skill.validate()?;
        }
        if self.width == 0 || self.height == 0 {
            return Err(WidgetError::Validation(
                "width and height must be greater than 0".to_string(),
            ));
        }
        if let Some(color) = &self.bar_color {
            svg::validate_color(color)?;
        }
        Ok(())
    }
}

impl ImageWidget for SkillsConfig {
    fn image_url(&self, urls: &EndpointUrls) -> String {
        let mut params = vec![
            ("skills", self.encoded_skills()),
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("theme", self.theme.clone()),
        ];
        if !self.animated {
            params.push(("animated", "false".to_string()));
        }
        if let Some(color) = &self.bar_color {
            params.push(("bar_color", color.trim_start_matches('#').to_string()));
        }
        if let Some(title) = &self.title {
            params.push(("title", title.clone()));
        }
        EndpointUrls::build(&urls.widgets, "/api/skills", &params)
    }
}

impl SvgWidget for SkillsConfig {
    fn render_svg(&self) -> String {
        svg::progress::render_skill_bars(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_url_encoding() {
        let config = SkillsConfig::new(vec![Skill::new("TypeScript", 85)]);
        let url = config.image_url(&EndpointUrls::default());

        assert!(url.contains("skills=TypeScript%3A85"));
        assert!(url.contains("width=400"));
        assert!(url.contains("height=300"));
    }

    #[test]
    fn test_skill_decode() {
        assert_eq!(Skill::decode("Rust:90").unwrap(), Skill::new("Rust", 90));
        assert!(Skill::decode("Rust").is_err());
        assert!(Skill::decode("Rust:abc").is_err());
        assert!(Skill::decode("Rust:101").is_err());
        assert!(Skill::decode(":50").is_err());
    }

    #[test]
    fn test_from_query() {
        let config =
            SkillsConfig::from_query("TypeScript:85,Rust:70,", Some(500), None, None).unwrap();
        assert_eq!(config.skills.len(), 2);
        assert_eq!(config.width, 500);
        assert_eq!(config.height, 300);
    }

    #[test]
    fn test_validation() {
        assert!(SkillsConfig::new(vec![]).validate().is_err());
        assert!(SkillsConfig::new(vec![Skill::new("Go", 50)]).validate().is_ok());

        let mut config = SkillsConfig::new(vec![Skill::new("Go", 50)]);
        config.bar_color = Some("not-a-color".to_string());
        assert!(config.validate().is_err());
    }
}
