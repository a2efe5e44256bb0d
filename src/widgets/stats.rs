//! Username-driven image cards: stats, top languages and streak

use crate::error::{Result, WidgetError};
use crate::widgets::{sorted, validate_username, EndpointUrls, ImageWidget, WidgetConfig, WidgetKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn default_theme() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_langs_count() -> u8 {
    5
}

/// GitHub stats card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsCardConfig {
    pub username: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub show_icons: bool,
    #[serde(default)]
    pub hide_border: bool,
    /// Stat rows to hide (stars, commits, prs, issues, contribs)
    #[serde(default)]
    pub hide: Vec<String>,
    #[serde(default)]
    pub include_all_commits: bool,
    #[serde(default)]
    pub count_private: bool,
    /// Markdown alt text; not part of the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl StatsCardConfig {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            theme: default_theme(),
            show_icons: true,
            hide_border: false,
            hide: Vec::new(),
            include_all_commits: false,
            count_private: false,
            alt_text: None,
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("username", self.username.trim().to_string()),
            ("theme", self.theme.clone()),
            ("show_icons", self.show_icons.to_string()),
        ];
        if self.hide_border {
            params.push(("hide_border", "true".to_string()));
        }
        let hide = sorted(&self.hide);
        if !hide.is_empty() {
            params.push(("hide", hide.join(",")));
        }
        if self.include_all_commits {
            params.push(("include_all_commits", "true".to_string()));
        }
        if self.count_private {
            params.push(("count_private", "true".to_string()));
        }
        params
    }
}

impl WidgetConfig for StatsCardConfig {
    const KIND: WidgetKind = WidgetKind::Stats;

    fn hash_fields(&self) -> Value {
        json!({
            "username": self.username.trim(),
            "theme": self.theme,
            "show_icons": self.show_icons,
            "hide_border": self.hide_border,
            "hide": sorted(&self.hide),
            "include_all_commits": self.include_all_commits,
            "count_private": self.count_private,
        })
    }

    fn validate(&self) -> Result<()> {
        validate_username(&self.username)
    }
}

impl ImageWidget for StatsCardConfig {
    fn image_url(&self, urls: &EndpointUrls) -> String {
        EndpointUrls::build(&urls.stats, "/api", &self.query())
    }
}

/// Layouts offered by the top-languages card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageLayout {
    #[default]
    Normal,
    Compact,
    Donut,
    Pie,
}

impl LanguageLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageLayout::Normal => "normal",
            LanguageLayout::Compact => "compact",
            LanguageLayout::Donut => "donut",
            LanguageLayout::Pie => "pie",
        }
    }
}

/// Most-used languages chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLanguagesConfig {
    pub username: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub layout: LanguageLayout,
    #[serde(default = "default_langs_count")]
    pub langs_count: u8,
    #[serde(default)]
    pub hide_border: bool,
    /// Languages to leave out of the chart
    #[serde(default)]
    pub hide: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl TopLanguagesConfig {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            theme: default_theme(),
            layout: LanguageLayout::default(),
            langs_count: default_langs_count(),
            hide_border: false,
            hide: Vec::new(),
            alt_text: None,
        }
    }
}

impl WidgetConfig for TopLanguagesConfig {
    const KIND: WidgetKind = WidgetKind::TopLanguages;

    fn hash_fields(&self) -> Value {
        json!({
            "username": self.username.trim(),
            "theme": self.theme,
            "layout": self.layout.as_str(),
            "langs_count": self.langs_count,
            "hide_border": self.hide_border,
            "hide": sorted(&self.hide),
        })
    }

    fn validate(&self) -> Result<()> {
        validate_username(&self.username)?;
        if !(1..=20).contains(&self.langs_count) {
            return Err(WidgetError::Validation(format!(
                "langs_count must be between 1 and 20, got {}",
                self.langs_count
            )));
        }
        Ok(())
    }
}

impl ImageWidget for TopLanguagesConfig {
    fn image_url(&self, urls: &EndpointUrls) -> String {
        let mut params = vec![
            ("username", self.username.trim().to_string()),
            ("layout", self.layout.as_str().to_string()),
            ("langs_count", self.langs_count.to_string()),
            ("theme", self.theme.clone()),
        ];
        if self.hide_border {
            params.push(("hide_border", "true".to_string()));
        }
        let hide = sorted(&self.hide);
        if !hide.is_empty() {
            params.push(("hide", hide.join(",")));
        }
        EndpointUrls::build(&urls.stats, "/api/top-langs", &params)
    }
}

/// Contribution streak card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    pub username: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub hide_border: bool,
    /// e.g. `M j[, Y]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl StreakConfig {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            theme: default_theme(),
            hide_border: false,
            date_format: None,
            alt_text: None,
        }
    }
}

impl WidgetConfig for StreakConfig {
    const KIND: WidgetKind = WidgetKind::Streak;

    fn hash_fields(&self) -> Value {
        json!({
            "username": self.username.trim(),
            "theme": self.theme,
            "hide_border": self.hide_border,
            "date_format": self.date_format,
        })
    }

    fn validate(&self) -> Result<()> {
        validate_username(&self.username)
    }
}

impl ImageWidget for StreakConfig {
    fn image_url(&self, urls: &EndpointUrls) -> String {
        let mut params = vec![
            ("user", self.username.trim().to_string()),
            ("theme", self.theme.clone()),
        ];
        if self.hide_border {
            params.push(("hide_border", "true".to_string()));
        }
        if let Some(format) = &self.date_format {
            params.push(("date_format", format.clone()));
        }
        EndpointUrls::build(&urls.streak, "/", &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::config_hash;

    #[test]
    fn test_stats_url() {
        let mut config = StatsCardConfig::for_user("octocat");
        config.hide = vec!["prs".to_string(), "issues".to_string()];
        config.hide_border = true;

        let url = config.image_url(&EndpointUrls::default());
        assert_eq!(
            url,
            "https://github-readme-stats.vercel.app/api?username=octocat&theme=default&show_icons=true&hide_border=true&hide=issues%2Cprs"
        );
    }

    #[test]
    fn test_top_langs_url_and_validation() {
        let mut config = TopLanguagesConfig::for_user("octocat");
        config.layout = LanguageLayout::Compact;

        let url = config.image_url(&EndpointUrls::default());
        assert!(url.contains("/api/top-langs?"));
        assert!(url.contains("layout=compact"));
        assert!(url.contains("langs_count=5"));

        config.langs_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_streak_url() {
        let mut config = StreakConfig::for_user("octocat");
        config.date_format = Some("M j[, Y]".to_string());

        let url = config.image_url(&EndpointUrls::default());
        assert!(url.starts_with("https://streak-stats.demolab.com/?user=octocat"));
        assert!(url.contains("date_format=M+j%5B%2C+Y%5D"));
    }

    #[test]
    fn test_username_case_changes_hash_and_url() {
        let lower = StatsCardConfig::for_user("octocat");
        let mixed = StatsCardConfig::for_user("OctoCat");
        assert_ne!(config_hash(&lower), config_hash(&mixed));
        assert_ne!(
            lower.image_url(&EndpointUrls::default()),
            mixed.image_url(&EndpointUrls::default())
        );

        let padded = StreakConfig::for_user("  octocat ");
        assert_eq!(config_hash(&padded), config_hash(&StreakConfig::for_user("octocat")));
    }

    #[test]
    fn test_empty_username_fails_validation() {
        let config = StatsCardConfig::for_user("");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, WidgetError::Validation(_)));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: TopLanguagesConfig =
            serde_yaml::from_str("username: octocat\nlayout: donut\n").unwrap();
        assert_eq!(config.layout, LanguageLayout::Donut);
        assert_eq!(config.langs_count, 5);
        assert_eq!(config.theme, "default");
    }
}
