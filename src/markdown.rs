//! Markdown synthesis
//!
//! Everything here is a pure function of widget configuration. Image URLs are
//! built by the same [`ImageWidget::image_url`] the producers verify, so the
//! markdown always points at what the store generated. Invalid or empty
//! configuration yields a placeholder comment instead of an error.

use crate::widgets::{
    EndpointUrls, ImageWidget, LanguageLayout, SkillsConfig, StatsCardConfig, StreakConfig,
    SvgWidget, TopLanguagesConfig, WaveConfig, WidgetConfig,
};
use serde::{Deserialize, Serialize};

pub const STATS_PLACEHOLDER: &str = "<!-- Enter a GitHub username to generate your stats card -->";
pub const TOP_LANGUAGES_PLACEHOLDER: &str =
    "<!-- Enter a GitHub username to generate your top languages card -->";
pub const STREAK_PLACEHOLDER: &str = "<!-- Enter a GitHub username to generate your streak card -->";
pub const SKILLS_PLACEHOLDER: &str = "<!-- Add at least one skill to generate progress bars -->";
pub const WAVE_PLACEHOLDER: &str = "<!-- Add at least one valid color to generate the wave banner -->";
pub const PROFILE_PLACEHOLDER: &str =
    "<!-- Enter a GitHub username to generate your profile widgets -->";

/// A widget that can describe itself as a markdown fragment
pub trait MarkdownWidget: WidgetConfig {
    /// Returned verbatim when the config cannot produce an artifact
    const PLACEHOLDER: &'static str;

    /// Fragment for a config that passed validation
    fn render_markdown(&self, urls: &EndpointUrls) -> String;

    fn to_markdown(&self, urls: &EndpointUrls) -> String {
        match self.validate() {
            Ok(()) => self.render_markdown(urls),
            Err(_) => Self::PLACEHOLDER.to_string(),
        }
    }
}

fn image(alt: &str, url: &str) -> String {
    format!("![{}]({})", escape_alt(alt), url)
}

fn escape_alt(alt: &str) -> String {
    alt.replace('[', "\\[").replace(']', "\\]")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

impl MarkdownWidget for StatsCardConfig {
    const PLACEHOLDER: &'static str = STATS_PLACEHOLDER;

    fn render_markdown(&self, urls: &EndpointUrls) -> String {
        let alt = self.alt_text.as_deref().unwrap_or("GitHub Stats");
        image(alt, &self.image_url(urls))
    }
}

impl MarkdownWidget for TopLanguagesConfig {
    const PLACEHOLDER: &'static str = TOP_LANGUAGES_PLACEHOLDER;

    fn render_markdown(&self, urls: &EndpointUrls) -> String {
        let alt = self.alt_text.as_deref().unwrap_or("Top Languages");
        image(alt, &self.image_url(urls))
    }
}

impl MarkdownWidget for StreakConfig {
    const PLACEHOLDER: &'static str = STREAK_PLACEHOLDER;

    fn render_markdown(&self, urls: &EndpointUrls) -> String {
        let alt = self.alt_text.as_deref().unwrap_or("GitHub Streak");
        image(alt, &self.image_url(urls))
    }
}

impl MarkdownWidget for SkillsConfig {
    const PLACEHOLDER: &'static str = SKILLS_PLACEHOLDER;

    fn render_markdown(&self, urls: &EndpointUrls) -> String {
        let alt = self.alt_text.as_deref().unwrap_or("Skills");
        image(alt, &self.image_url(urls))
    }
}

impl MarkdownWidget for WaveConfig {
    const PLACEHOLDER: &'static str = WAVE_PLACEHOLDER;

    /// Inline SVG, so the banner needs no endpoint
    fn render_markdown(&self, _urls: &EndpointUrls) -> String {
        format!(
            "<div align=\"{}\">\n{}\n</div>",
            self.align.as_str(),
            self.render_svg()
        )
    }
}

/// Layout templates for the combined profile block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    /// Stats and languages in one table row
    #[default]
    SideBySide,
    /// Stats above languages
    Stacked,
    /// Stats and languages, with the streak card spanning a second row
    AllWidgets,
}

/// Cards combined by [`MarkdownSynthesizer::synthesize_profile`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCards {
    pub stats: StatsCardConfig,
    pub top_langs: TopLanguagesConfig,
    /// Derived from `stats` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakConfig>,
}

impl ProfileCards {
    /// Matching cards for one user and theme
    pub fn for_user(username: &str, theme: &str) -> Self {
        let mut stats = StatsCardConfig::for_user(username);
        stats.theme = theme.to_string();
        let mut top_langs = TopLanguagesConfig::for_user(username);
        top_langs.theme = theme.to_string();
        top_langs.layout = LanguageLayout::Compact;
        Self {
            stats,
            top_langs,
            streak: None,
        }
    }

    pub fn streak(&self) -> StreakConfig {
        self.streak.clone().unwrap_or_else(|| {
            let mut streak = StreakConfig::for_user(self.stats.username.clone());
            streak.theme = self.stats.theme.clone();
            streak.hide_border = self.stats.hide_border;
            streak
        })
    }
}

/// Builds markdown against a fixed set of endpoints
#[derive(Debug, Clone, Default)]
pub struct MarkdownSynthesizer {
    urls: EndpointUrls,
}

impl MarkdownSynthesizer {
    pub fn new(urls: EndpointUrls) -> Self {
        Self { urls }
    }

    pub fn urls(&self) -> &EndpointUrls {
        &self.urls
    }

    pub fn synthesize<W: MarkdownWidget>(&self, widget: &W) -> String {
        widget.to_markdown(&self.urls)
    }

    /// Combined stats block in the chosen arrangement
    pub fn synthesize_profile(&self, cards: &ProfileCards, arrangement: Arrangement) -> String {
        let streak = cards.streak();
        let valid = cards.stats.validate().is_ok()
            && cards.top_langs.validate().is_ok()
            && (arrangement != Arrangement::AllWidgets || streak.validate().is_ok());
        if !valid {
            return PROFILE_PLACEHOLDER.to_string();
        }

        let stats = cards.stats.image_url(&self.urls);
        let langs = cards.top_langs.image_url(&self.urls);

        match arrangement {
            Arrangement::SideBySide => format!(
                "<table>\n  <tr>\n    <td>{}</td>\n    <td>{}</td>\n  </tr>\n</table>",
                img_tag("GitHub Stats", &stats),
                img_tag("Top Languages", &langs)
            ),
            Arrangement::Stacked => format!(
                "<p align=\"center\">\n  {}\n</p>\n<p align=\"center\">\n  {}\n</p>",
                img_tag("GitHub Stats", &stats),
                img_tag("Top Languages", &langs)
            ),
            Arrangement::AllWidgets => format!(
                "<table>\n  <tr>\n    <td>{}</td>\n    <td>{}</td>\n  </tr>\n  <tr>\n    <td colspan=\"2\" align=\"center\">{}</td>\n  </tr>\n</table>",
                img_tag("GitHub Stats", &stats),
                img_tag("Top Languages", &langs),
                img_tag("GitHub Streak", &streak.image_url(&self.urls))
            ),
        }
    }
}

fn img_tag(alt: &str, url: &str) -> String {
    format!("<img src=\"{}\" alt=\"{}\"/>", escape_attr(url), escape_attr(alt))
}

/// A full README assembled from fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadmeDocument {
    blocks: Vec<String>,
}

impl ReadmeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(mut self, level: u8, text: &str) -> Self {
        let level = usize::from(level.clamp(1, 6));
        self.blocks.push(format!("{} {}", "#".repeat(level), text.trim()));
        self
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        if !text.trim().is_empty() {
            self.blocks.push(text.trim().to_string());
        }
        self
    }

    /// Append a fragment, optionally under its own `##` heading
    pub fn section(mut self, title: Option<&str>, fragment: String) -> Self {
        if let Some(title) = title {
            self.blocks.push(format!("## {}", title.trim()));
        }
        self.blocks.push(fragment);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks separated by blank lines, with a trailing newline
    pub fn render(&self) -> String {
        if self.blocks.is_empty() {
            return String::new();
        }
        let mut out = self.blocks.join("\n\n");
        out.push('\n');
        out
    }
}
