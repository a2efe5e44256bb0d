//! A README editing session
//!
//! One [`WidgetStore`] per widget kind, created together and mounted together.
//! A [`ReadmeSpec`] describes which widgets the README contains; applying it
//! drives the stores, and rendering it produces the markdown document.

use crate::cache::CacheConfig;
use crate::error::Result;
use crate::generator::{ArtifactProducer, GeneratorConfig};
use crate::markdown::{Arrangement, MarkdownSynthesizer, ProfileCards, ReadmeDocument};
use crate::producer::{http_client, HttpImageProducer, LocalSvgProducer};
use crate::settings::Settings;
use crate::store::{
    SkillsStore, StatsStore, StreakStore, TopLanguagesStore, WaveStore, WidgetRuntimeState,
    WidgetStore,
};
use crate::widgets::{
    SkillsConfig, StatsCardConfig, StreakConfig, TopLanguagesConfig, WaveConfig, WidgetConfig,
    WidgetKind,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Widgets that make up one README, as written in a YAML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave: Option<WaveConfig>,
    /// Combined stats block laid out by `arrangement`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileCards>,
    pub arrangement: Arrangement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsCardConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_langs: Option<TopLanguagesConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<SkillsConfig>,
}

impl ReadmeSpec {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            crate::error::WidgetError::Serialization(format!("invalid README spec: {}", e))
        })
    }

    /// Stats card a store should generate, standalone first
    pub fn stats_config(&self) -> Option<StatsCardConfig> {
        self.stats
            .clone()
            .or_else(|| self.profile.as_ref().map(|p| p.stats.clone()))
    }

    pub fn top_langs_config(&self) -> Option<TopLanguagesConfig> {
        self.top_langs
            .clone()
            .or_else(|| self.profile.as_ref().map(|p| p.top_langs.clone()))
    }

    /// Profile streak only counts when the arrangement shows it
    pub fn streak_config(&self) -> Option<StreakConfig> {
        self.streak.clone().or_else(|| {
            self.profile
                .as_ref()
                .filter(|_| self.arrangement == Arrangement::AllWidgets)
                .map(ProfileCards::streak)
        })
    }

    /// Assemble the README; pure
    pub fn render(&self, synthesizer: &MarkdownSynthesizer) -> String {
        let mut doc = ReadmeDocument::new();

        if let Some(wave) = &self.wave {
            doc = doc.section(None, synthesizer.synthesize(wave));
        }
        if let Some(title) = &self.title {
            doc = doc.heading(1, title);
        }
        if let Some(intro) = &self.intro {
            doc = doc.paragraph(intro);
        }
        if let Some(profile) = &self.profile {
            doc = doc.section(
                Some("GitHub Stats"),
                synthesizer.synthesize_profile(profile, self.arrangement),
            );
        }
        if let Some(stats) = &self.stats {
            doc = doc.section(None, synthesizer.synthesize(stats));
        }
        if let Some(top_langs) = &self.top_langs {
            doc = doc.section(None, synthesizer.synthesize(top_langs));
        }
        if let Some(streak) = &self.streak {
            doc = doc.section(None, synthesizer.synthesize(streak));
        }
        if let Some(skills) = &self.skills {
            let title = skills.title.as_deref().unwrap_or("Skills");
            doc = doc.section(Some(title), synthesizer.synthesize(skills));
        }

        doc.render()
    }
}

/// Settled state of every store after [`ReadmeSession::settle`]
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub widgets: Vec<(WidgetKind, WidgetRuntimeState)>,
}

impl SessionReport {
    pub fn failures(&self) -> impl Iterator<Item = &(WidgetKind, WidgetRuntimeState)> {
        self.widgets.iter().filter(|(_, state)| state.error.is_some())
    }

    pub fn is_ok(&self) -> bool {
        self.failures().next().is_none()
    }
}

pub struct ReadmeSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    synthesizer: MarkdownSynthesizer,
    pub stats: StatsStore,
    pub top_langs: TopLanguagesStore,
    pub streak: StreakStore,
    pub skills: SkillsStore,
    pub wave: WaveStore,
}

impl ReadmeSession {
    /// Stores wired to the configured endpoints; image cards are verified
    /// over HTTP, skills and wave are drawn locally
    pub fn new(settings: &Settings) -> Result<Self> {
        let urls = settings.endpoint_urls()?;
        let client = http_client(settings.request_timeout())?;
        let images = Arc::new(HttpImageProducer::new(client, urls.clone()));
        let generator = settings.generator_config();
        let remote = settings.remote_cache_config();
        let local = settings.local_cache_config();

        Ok(Self::from_stores(
            MarkdownSynthesizer::new(urls),
            build_store(images.clone(), &remote, &generator)?,
            build_store(images.clone(), &remote, &generator)?,
            build_store(images, &remote, &generator)?,
            build_store(Arc::new(LocalSvgProducer), &local, &generator)?,
            build_store(Arc::new(LocalSvgProducer), &local, &generator)?,
        ))
    }

    pub fn from_stores(
        synthesizer: MarkdownSynthesizer,
        stats: StatsStore,
        top_langs: TopLanguagesStore,
        streak: StreakStore,
        skills: SkillsStore,
        wave: WaveStore,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            synthesizer,
            stats,
            top_langs,
            streak,
            skills,
            wave,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn synthesizer(&self) -> &MarkdownSynthesizer {
        &self.synthesizer
    }

    pub fn mount_all(&self) {
        self.stats.mount();
        self.top_langs.mount();
        self.streak.mount();
        self.skills.mount();
        self.wave.mount();
    }

    pub fn unmount_all(&self) {
        self.stats.unmount();
        self.top_langs.unmount();
        self.streak.unmount();
        self.skills.unmount();
        self.wave.unmount();
    }

    /// Push every widget in `spec` to its store; absent widgets are reset
    pub fn apply(&self, spec: &ReadmeSpec) {
        info!("Session {} applying README spec", self.id);
        apply_one(&self.stats, spec.stats_config());
        apply_one(&self.top_langs, spec.top_langs_config());
        apply_one(&self.streak, spec.streak_config());
        apply_one(&self.skills, spec.skills.clone());
        apply_one(&self.wave, spec.wave.clone());
    }

    /// Wait for every store to stop loading
    pub async fn settle(&self) -> SessionReport {
        let (stats, top_langs, streak, skills, wave) = futures::join!(
            self.stats.settled(),
            self.top_langs.settled(),
            self.streak.settled(),
            self.skills.settled(),
            self.wave.settled(),
        );

        SessionReport {
            session_id: self.id,
            widgets: vec![
                (WidgetKind::Stats, stats),
                (WidgetKind::TopLanguages, top_langs),
                (WidgetKind::Streak, streak),
                (WidgetKind::Skills, skills),
                (WidgetKind::Wave, wave),
            ],
        }
    }

    pub fn render(&self, spec: &ReadmeSpec) -> String {
        spec.render(&self.synthesizer)
    }
}

impl Drop for ReadmeSession {
    fn drop(&mut self) {
        self.unmount_all();
    }
}

fn build_store<C, P>(producer: Arc<P>, cache: &CacheConfig, generator: &GeneratorConfig) -> Result<WidgetStore<C>>
where
    C: WidgetConfig,
    P: ArtifactProducer<C> + 'static,
{
    let producer: Arc<dyn ArtifactProducer<C>> = producer;
    WidgetStore::with_cache_config(producer, cache.clone(), generator.clone())
}

fn apply_one<C: WidgetConfig>(store: &WidgetStore<C>, config: Option<C>) {
    match config {
        Some(config) => store.generate(config),
        None => store.reset(),
    }
}
