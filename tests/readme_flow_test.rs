//! End-to-end README flow: spec file → stores → markdown, plus saved specs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use readme_forge::markdown::{STATS_PLACEHOLDER, STREAK_PLACEHOLDER};
use readme_forge::{
    config_hash, Arrangement, Artifact, ArtifactCache, ArtifactProducer, CacheConfig,
    ConfigStorage, GeneratorConfig, LocalSvgProducer, MarkdownSynthesizer, ReadmeSession,
    ReadmeSpec, Result, SkillsConfig, StatsCardConfig, StreakConfig, TopLanguagesConfig,
    WaveConfig, WidgetStatus, WidgetStore,
};

const SPEC: &str = r##"
title: "Hi, I'm Octocat"
intro: Building developer tools.
wave:
  colors: ["#0ea5e9", "#22d3ee"]
  waves: 2
  text: octocat
arrangement: all_widgets
profile:
  stats: { username: octocat, theme: dark, hide: [prs, issues] }
  top_langs: { username: octocat, theme: dark, layout: compact }
skills:
  skills:
    - { name: TypeScript, level: 85 }
    - { name: Rust, level: 70 }
"##;

/// Answers every card with a fake URL and counts calls
#[derive(Default)]
struct CountingProducer {
    calls: AtomicUsize,
}

#[async_trait]
impl<C: readme_forge::WidgetConfig> ArtifactProducer<C> for CountingProducer {
    async fn produce(&self, config: &C) -> Result<Artifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Artifact::Url(format!("https://cards.test/{}", config_hash(config))))
    }
}

fn store<C: readme_forge::WidgetConfig>(producer: Arc<dyn ArtifactProducer<C>>) -> WidgetStore<C> {
    WidgetStore::new(
        producer,
        ArtifactCache::new(CacheConfig::remote_image()),
        GeneratorConfig::default(),
    )
}

fn session(cards: &Arc<CountingProducer>) -> ReadmeSession {
    ReadmeSession::from_stores(
        MarkdownSynthesizer::default(),
        store::<StatsCardConfig>(cards.clone()),
        store::<TopLanguagesConfig>(cards.clone()),
        store::<StreakConfig>(cards.clone()),
        store::<SkillsConfig>(Arc::new(LocalSvgProducer)),
        store::<WaveConfig>(Arc::new(LocalSvgProducer)),
    )
}

#[tokio::test(start_paused = true)]
async fn test_spec_drives_every_store() {
    let spec = ReadmeSpec::from_yaml(SPEC).unwrap();
    let cards = Arc::new(CountingProducer::default());
    let session = session(&cards);
    session.mount_all();

    session.apply(&spec);
    let report = session.settle().await;

    assert!(report.is_ok());
    assert_eq!(report.widgets.len(), 5);
    // stats, top languages, and the streak added by all_widgets
    assert_eq!(cards.calls.load(Ordering::SeqCst), 3);
    assert!(matches!(session.wave.status(), WidgetStatus::Ready(Artifact::Svg(_))));
    assert!(matches!(session.streak.status(), WidgetStatus::Ready(Artifact::Url(_))));
}

#[tokio::test(start_paused = true)]
async fn test_reapplying_same_spec_is_free() {
    let spec = ReadmeSpec::from_yaml(SPEC).unwrap();
    let cards = Arc::new(CountingProducer::default());
    let session = session(&cards);
    session.mount_all();

    session.apply(&spec);
    session.settle().await;
    session.apply(&spec);
    session.settle().await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(cards.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_reordered_hide_list_hits_cache() {
    let cards = Arc::new(CountingProducer::default());
    let session = session(&cards);
    session.mount_all();

    let mut config = StatsCardConfig::for_user("octocat");
    config.hide = vec!["prs".to_string(), "issues".to_string()];
    session.stats.generate(config.clone());
    session.stats.settled().await;

    config.hide.reverse();
    config.alt_text = Some("Stats".to_string());
    session.stats.generate(config);
    session.stats.settled().await;

    assert_eq!(cards.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rendered_document() {
    let spec = ReadmeSpec::from_yaml(SPEC).unwrap();
    let markdown = spec.render(&MarkdownSynthesizer::default());

    assert!(markdown.starts_with("<div align=\"center\">\n<svg"));
    assert!(markdown.contains("# Hi, I'm Octocat\n\nBuilding developer tools."));
    assert!(markdown.contains("## GitHub Stats"));
    assert!(markdown.contains("colspan=\"2\""));
    assert!(markdown.contains("hide=issues%2Cprs"));
    assert!(markdown.contains("## Skills\n\n![Skills]("));
    assert!(markdown.contains("skills=TypeScript%3A85%2CRust%3A70"));
    assert!(markdown.ends_with(")\n"));
}

#[test]
fn test_username_placeholders_in_document() {
    let spec = ReadmeSpec {
        stats: Some(StatsCardConfig::for_user("")),
        streak: Some(StreakConfig::for_user("")),
        arrangement: Arrangement::Stacked,
        ..Default::default()
    };
    let markdown = spec.render(&MarkdownSynthesizer::default());
    assert_eq!(markdown, format!("{}\n\n{}\n", STATS_PLACEHOLDER, STREAK_PLACEHOLDER));
}

#[test]
fn test_saved_spec_round_trip() {
    let temp = TempDir::new().unwrap();
    let storage = ConfigStorage::new(temp.path());
    let spec = ReadmeSpec::from_yaml(SPEC).unwrap();

    assert!(storage.save("main", &spec));
    let loaded: Option<ReadmeSpec> = storage.load("main", None);
    assert_eq!(loaded, Some(spec));

    assert!(storage.remove("main"));
    let loaded: Option<ReadmeSpec> = storage.load("main", None);
    assert!(loaded.is_none());
}
