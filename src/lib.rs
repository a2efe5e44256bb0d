//! # readme-forge
//!
//! Widget engine and markdown builder for GitHub profile READMEs.
//!
//! ## Features
//!
//! - Five widget kinds: stats card, top languages, streak, skill bars, wave banner
//! - Order-independent cache keys built from the fields that affect the image
//! - Per-widget TTL cache
//! - Debounced, single-flight generation with retry and exponential backoff
//! - Stores with sequence-numbered completions, so stale responses are dropped
//! - Pure markdown synthesis with placeholders for incomplete configs
//! - A small axum server that renders the skills and wave SVGs
//!
//! ## Markdown only
//!
//! ```
//! use readme_forge::{MarkdownSynthesizer, Skill, SkillsConfig};
//!
//! let synthesizer = MarkdownSynthesizer::default();
//! let skills = SkillsConfig::new(vec![Skill::new("TypeScript", 85)]);
//! let markdown = synthesizer.synthesize(&skills);
//! assert!(markdown.contains("skills=TypeScript%3A85"));
//! ```
//!
//! ## Driving a store
//!
//! ```no_run
//! use readme_forge::{ReadmeSession, Settings, StatsCardConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = ReadmeSession::new(&Settings::load(None)?)?;
//!     session.mount_all();
//!
//!     session.stats.generate(StatsCardConfig::for_user("octocat"));
//!     let state = session.stats.settled().await;
//!     println!("{:?}", state.status());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod error;
pub mod generator;
pub mod github;
pub mod hash;
pub mod markdown;
pub mod producer;
pub mod session;
pub mod settings;
pub mod storage;
pub mod store;
pub mod svg;
pub mod widgets;

// Re-export main types for convenience
pub use cache::{Artifact, ArtifactCache, CacheConfig, CacheConfigBuilder, CacheEntry, CacheKey, CacheStats};
pub use error::{ErrorKind, Result, WidgetError};
pub use generator::{ArtifactProducer, DebouncedGenerator, GenerationRequest, GeneratorConfig};
pub use github::{GithubClient, UserStats};
pub use hash::config_hash;
pub use markdown::{Arrangement, MarkdownSynthesizer, MarkdownWidget, ProfileCards, ReadmeDocument};
pub use producer::{HttpImageProducer, LocalSvgProducer};
pub use session::{ReadmeSession, ReadmeSpec, SessionReport};
pub use settings::Settings;
pub use storage::ConfigStorage;
pub use store::{WidgetRuntimeState, WidgetStatus, WidgetStore};
pub use widgets::{
    EndpointUrls, ImageWidget, LanguageLayout, Skill, SkillsConfig, StatsCardConfig, StreakConfig,
    SvgWidget, TopLanguagesConfig, WaveAlign, WaveConfig, WidgetConfig, WidgetKind,
};
