//! lamco-scroll - smooth scrolling engine
//!
//! Entry point for the binary. Runs the engine against the replay backend:
//! input events are read as JSON lines, synthetic scroll events are written
//! to stdout as JSON lines, and logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lamco_scroll::config::{Config, CONFIG_ENV};
use lamco_scroll::control::OverrideResolver;
use lamco_scroll::engine::{IntervalClock, ScrollEngine, TickSource};
use lamco_scroll::platform::replay::{self, LineSink, ReplayPointer, ReplayTap};
use lamco_scroll::platform::EventTap;
use lamco_scroll::service::ScrollService;
use lamco_scroll::utils::format_user_error;

/// Command-line arguments for lamco-scroll
#[derive(Parser, Debug)]
#[command(name = "lamco-scroll")]
#[command(version, about = "Smooth scrolling engine", long_about = None)]
pub struct Args {
    /// Configuration file path (default: <config dir>/lamco-scroll/config.toml)
    #[arg(short, long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Replay input file with one JSON event per line (default: stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "compact")]
    pub log_format: String,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Where the configuration came from
enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    NoConfigDir,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before logging so the configured level can apply
    let (loaded, source) = load_config(&args);
    let configured_level = loaded
        .as_ref()
        .map(|config| config.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    init_logging(&args, &configured_level)?;

    info!("════════════════════════════════════════════════════════");
    info!("  lamco-scroll v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {}", env!("BUILD_DATE"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return Err(e);
        }
    };

    match &source {
        ConfigSource::File(path) => info!("Configuration loaded from {}", path.display()),
        ConfigSource::Missing(path) => {
            warn!("Config file {} not found, using defaults", path.display())
        }
        ConfigSource::NoConfigDir => warn!("No configuration directory, using defaults"),
    }
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = run(&args, &config).await {
        eprintln!("{}", format_user_error(&e));
        return Err(e);
    }

    Ok(())
}

fn load_config(args: &Args) -> (Result<Config>, ConfigSource) {
    let Some(path) = args.config.clone().or_else(Config::default_path) else {
        return (Ok(Config::default_config()), ConfigSource::NoConfigDir);
    };

    if path.exists() {
        (Config::load(&path), ConfigSource::File(path))
    } else if args.config.is_some() {
        let error = anyhow::anyhow!("Config file not found: {}", path.display());
        (Err(error), ConfigSource::Missing(path))
    } else {
        (Ok(Config::default_config()), ConfigSource::Missing(path))
    }
}

async fn run(args: &Args, config: &Config) -> Result<()> {
    let defaults = config.global_defaults()?;
    let resolver = OverrideResolver::new(Arc::new(config.exception_table()), defaults);
    info!(
        "{} exception rules, allowlist {}",
        config.exceptions.len(),
        if defaults.allowlist { "on" } else { "off" }
    );

    // Without a clock the engine degrades to pass-through
    let clock = match IntervalClock::new(config.emission.refresh_hz) {
        Ok(clock) => Some(Arc::new(clock)),
        Err(e) => {
            warn!("{}; scroll events will pass through unsmoothed", e);
            None
        }
    };

    let pointer = Arc::new(ReplayPointer::new());
    let tap = Arc::new(ReplayTap::new("scroll"));
    let engine = Arc::new(ScrollEngine::new(
        resolver,
        pointer.clone(),
        Arc::new(LineSink::new(std::io::stdout())),
        clock.clone().map(|clock| clock as Arc<dyn TickSource>),
        config.emission.jitter_warmup_ticks,
    ));

    let service = ScrollService::new(
        engine.clone(),
        clock.clone(),
        vec![tap.clone() as Arc<dyn EventTap>],
        config.watchdog_interval(),
    );
    service.start().context("Failed to start scroll smoothing")?;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            info!("Replaying events from {}", path.display());
            Box::new(BufReader::new(file))
        }
        None => {
            info!("Replaying events from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
    };

    let interrupted = tokio::select! {
        result = replay::run(reader, &engine, &pointer, tap.as_ref()) => {
            result.context("Replay input failed")?;
            false
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            true
        }
    };

    if !interrupted {
        let poll = clock
            .as_ref()
            .map(|clock| clock.period())
            .unwrap_or(Duration::from_millis(10));
        while engine.is_emitting() {
            tokio::time::sleep(poll).await;
        }
    }

    service.stop().await;

    let stats = engine.stats();
    info!(
        "Engine statistics: {}",
        serde_json::to_string(&stats).context("Failed to serialize statistics")?
    );

    Ok(())
}

fn init_logging(args: &Args, configured_level: &str) -> Result<()> {
    use std::fs::File;

    let log_level = match args.verbose {
        0 => configured_level,
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("lamco={level},warn", level = log_level))
    });

    // stdout carries the synthetic events, so logs go to stderr
    if let Some(log_file_path) = &args.log_file {
        let file = File::create(log_file_path)
            .with_context(|| format!("Failed to create log file: {}", log_file_path.display()))?;

        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "pretty" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path.display());
    } else {
        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            "pretty" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
        }
    }

    Ok(())
}
