mod collaborators;
mod replay;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use reprise_config::{ConfigLoader, RepriseConfig, validate};
use reprise_core::ports::LocalProgressCache;
use reprise_core::progress::{DiskProgressCache, ProgressCacheRoot};
use reprise_core::skip_track::{build_cues, render_vtt};
use reprise_model::{EpisodeKey, SkipInterval};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "reprisectl")]
#[command(about = "Replay player events through a playback session and inspect saved progress")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct GlobalArgs {
    /// Config file (TOML or JSON); otherwise REPRISE_CONFIG_PATH and the default search apply
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a timed event script through a playback session
    Replay {
        /// JSON script: { "context": {..}, "events": [{ "at_ms", "event" }], "tail_ms" }
        script: PathBuf,
        /// Signed-in viewer; enables remote writes and completion marking
        #[arg(long)]
        viewer: Option<String>,
        /// Remote progress store base URL (overrides config)
        #[arg(long, env = "REPRISE_REMOTE_URL")]
        remote: Option<String>,
        /// Progress cache directory (overrides config)
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Playback speed multiplier for script timing and session timers
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
    /// Print the locally cached progress of an episode
    Progress {
        episode_key: String,
        /// Progress cache directory (overrides config)
        #[arg(long)]
        cache: Option<PathBuf>,
    },
    /// Render the WebVTT skip track for a list of intervals
    Track {
        /// JSON array of { "startTime", "endTime", "label" }
        intervals: PathBuf,
        /// Episode duration in seconds
        #[arg(long)]
        duration: f64,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Override via RUST_LOG.
                "info,reprise_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &GlobalArgs) -> anyhow::Result<RepriseConfig> {
    if let Some(path) = &args.config {
        let config = reprise_config::loader::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        validate(&config).context("invalid configuration")?;
        return Ok(config);
    }
    let load = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;
    info!(source = ?load.source, "using configuration");
    Ok(load.config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Replay {
            script,
            viewer,
            remote,
            cache,
            speed,
        } => {
            let config = load_config(&cli.global)?;
            replay::run(
                replay::ReplayOptions {
                    script,
                    viewer,
                    remote,
                    cache,
                    speed,
                },
                config,
            )
            .await
        }
        Command::Progress { episode_key, cache } => {
            let mut config = load_config(&cli.global)?;
            if cache.is_some() {
                config.cache.root = cache;
            }
            show_progress(&episode_key, &config.cache.resolved_root()).await
        }
        Command::Track {
            intervals,
            duration,
        } => print_track(&intervals, duration),
    }
}

async fn show_progress(raw_key: &str, cache_root: &Path) -> anyhow::Result<()> {
    let key = EpisodeKey::new(raw_key).context("invalid episode key")?;
    let cache = DiskProgressCache::new(ProgressCacheRoot::new(cache_root));
    match cache
        .get(&key)
        .await
        .with_context(|| format!("failed to read progress cache {}", cache_root.display()))?
    {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("no cached progress for {key}"),
    }
    Ok(())
}

fn print_track(path: &Path, duration: f64) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read intervals {}", path.display()))?;
    let parsed: Vec<SkipInterval> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid intervals {}", path.display()))?;
    let intervals = parsed
        .into_iter()
        .map(|i| SkipInterval::new(i.start_time, i.end_time, i.label))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid skip interval")?;

    let cues = build_cues(&intervals, duration);
    if cues.is_empty() {
        println!("no skip intervals; track omitted");
    } else {
        print!("{}", render_vtt(&cues));
    }
    Ok(())
}
