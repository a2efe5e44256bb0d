use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use readme_forge::api::{ApiServer, ApiServerConfig};
use readme_forge::producer::http_client;
use readme_forge::{
    Arrangement, ConfigStorage, GithubClient, ProfileCards, ReadmeSession, ReadmeSpec, Settings,
};

#[derive(Parser)]
#[command(name = "readme-forge")]
#[command(about = "Build GitHub profile READMEs from widget configs", long_about = None)]
struct Cli {
    /// Settings file (defaults to ./readme-forge.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the README markdown for a spec
    Render {
        /// README spec (YAML)
        spec: Option<PathBuf>,

        /// Use a spec saved with `config save`
        #[arg(long, conflicts_with = "spec")]
        saved: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Check every image endpoint before writing
        #[arg(long)]
        verify: bool,
    },

    /// Generate every widget and write README.md plus the SVG artifacts
    Preview {
        /// README spec (YAML)
        spec: Option<PathBuf>,

        /// Use a spec saved with `config save`
        #[arg(long, conflicts_with = "spec")]
        saved: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = "./preview")]
        out_dir: PathBuf,
    },

    /// Serve the skills and wave endpoints
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show a GitHub user's public numbers and a starter stats block
    User {
        username: String,

        /// Layout of the starter block
        #[arg(long, value_enum, default_value = "side-by-side")]
        arrangement: ArrangementArg,
    },

    /// Manage saved README specs
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Save a spec file under a key
    Save { key: String, spec: PathBuf },

    /// Print a saved spec
    Show { key: String },

    /// Delete a saved spec
    Remove { key: String },

    /// List saved keys
    List,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ArrangementArg {
    SideBySide,
    Stacked,
    AllWidgets,
}

impl From<ArrangementArg> for Arrangement {
    fn from(arg: ArrangementArg) -> Self {
        match arg {
            ArrangementArg::SideBySide => Arrangement::SideBySide,
            ArrangementArg::Stacked => Arrangement::Stacked,
            ArrangementArg::AllWidgets => Arrangement::AllWidgets,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "readme_forge=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let storage = open_storage(&settings);

    match cli.command {
        Commands::Render {
            spec,
            saved,
            output,
            verify,
        } => {
            let spec = load_spec(spec.as_deref(), saved.as_deref(), &storage)?;
            let session = ReadmeSession::new(&settings)?;

            if verify {
                session.mount_all();
                session.apply(&spec);
                let report = session.settle().await;
                let mut failed = false;
                for (kind, state) in report.failures() {
                    failed = true;
                    if let Some(error) = &state.error {
                        eprintln!("{}: {} ({})", kind, error, error.kind());
                    }
                }
                if failed {
                    bail!("one or more widgets failed to generate");
                }
            }

            let markdown = session.render(&spec);
            match output {
                Some(path) => {
                    std::fs::write(&path, &markdown)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Wrote {:?}", path);
                }
                None => print!("{}", markdown),
            }
        }

        Commands::Preview {
            spec,
            saved,
            out_dir,
        } => {
            let spec = load_spec(spec.as_deref(), saved.as_deref(), &storage)?;
            let session = ReadmeSession::new(&settings)?;
            session.mount_all();
            session.apply(&spec);
            let report = session.settle().await;

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {:?}", out_dir))?;
            std::fs::write(out_dir.join("README.md"), session.render(&spec))?;

            for (kind, state) in &report.widgets {
                match (&state.artifact, &state.error) {
                    (Some(artifact), _) if artifact.is_svg() => {
                        let path = out_dir.join(format!("{}.svg", kind));
                        std::fs::write(&path, artifact.as_str())?;
                        println!("  {:<10} {:?}", kind.as_str(), path);
                    }
                    (Some(artifact), _) => println!("  {:<10} {}", kind.as_str(), artifact),
                    (None, Some(error)) => println!("  {:<10} error: {}", kind.as_str(), error),
                    (None, None) => {}
                }
            }

            let report_path = out_dir.join("report.json");
            std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
            println!("Session {} written to {:?}", report.session_id, out_dir);
        }

        Commands::Serve { host, port } => {
            let mut config = ApiServerConfig::from(&settings);
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            println!("Starting widget server on {}:{}", config.host, config.port);
            println!("  GET /health");
            println!("  GET /api/skills?skills=Rust:90,Go:60");
            println!("  GET /api/wave?colors=6366f1,ec4899");

            ApiServer::new(config).start().await?;
        }

        Commands::User {
            username,
            arrangement,
        } => {
            let client = GithubClient::new(
                http_client(settings.request_timeout())?,
                &settings.github_api_url,
                settings.github_token.clone(),
            )?;
            let user = client.fetch_user(&username).await?;

            println!("{}", user.name.as_deref().unwrap_or(&username));
            if let Some(bio) = &user.bio {
                println!("  {}", bio);
            }
            println!("  Followers:    {}", user.followers);
            println!("  Following:    {}", user.following);
            println!("  Public repos: {}", user.public_repos);
            println!("  Public gists: {}", user.public_gists);
            println!();

            let session = ReadmeSession::new(&settings)?;
            let cards = ProfileCards::for_user(&username, "default");
            println!(
                "{}",
                session
                    .synthesizer()
                    .synthesize_profile(&cards, arrangement.into())
            );
        }

        Commands::Config { action } => match action {
            ConfigAction::Save { key, spec } => {
                let spec = read_spec(&spec)?;
                if !storage.save(&key, &spec) {
                    bail!("could not save '{}' (see log for details)", key);
                }
                println!("Saved '{}'", key);
            }
            ConfigAction::Show { key } => {
                let spec: Option<ReadmeSpec> = storage.load(&key, None);
                match spec {
                    Some(spec) => print!("{}", serde_yaml::to_string(&spec)?),
                    None => bail!("no saved spec named '{}'", key),
                }
            }
            ConfigAction::Remove { key } => {
                if storage.remove(&key) {
                    println!("Removed '{}'", key);
                } else {
                    println!("Nothing saved under '{}'", key);
                }
            }
            ConfigAction::List => {
                let keys = storage.keys();
                if keys.is_empty() {
                    println!("No saved specs");
                }
                for key in keys {
                    println!("  {}", key);
                }
            }
        },
    }

    Ok(())
}

fn open_storage(settings: &Settings) -> ConfigStorage {
    match settings.resolved_storage_dir() {
        Some(dir) => ConfigStorage::new(dir),
        None => {
            info!("No data directory available, saved specs are disabled");
            ConfigStorage::unavailable()
        }
    }
}

fn read_spec(path: &Path) -> Result<ReadmeSpec> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read spec: {:?}", path))?;
    Ok(ReadmeSpec::from_yaml(&content)?)
}

fn load_spec(path: Option<&Path>, saved: Option<&str>, storage: &ConfigStorage) -> Result<ReadmeSpec> {
    match (path, saved) {
        (Some(path), _) => read_spec(path),
        (None, Some(key)) => {
            let spec: Option<ReadmeSpec> = storage.load(key, None);
            spec.with_context(|| format!("no saved spec named '{}'", key))
        }
        (None, None) => bail!("pass a spec file or --saved <key>"),
    }
}
