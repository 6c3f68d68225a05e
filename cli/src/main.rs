use std::{io::stdout, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use engine::{AppConfig, ConsoleAlertSink, JsonlDetectionSource};
use fern::Dispatch;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "zonewatch")]
#[command(about = "Track detected objects through monitored zones and log the crossings")]
#[command(version)]
struct Cli {
    /// Path to the monitor configuration (JSON).
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Detection feed to process, overriding the configured one.
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Zone definitions to watch, overriding the configured ones.
    #[arg(long)]
    zones: Option<PathBuf>,

    /// Event log destination, overriding the configured one.
    #[arg(long)]
    log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(stdout())
        .apply()?;
    log_panics::init();

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(detections) = cli.detections {
        config.detections_file = detections.to_string_lossy().into_owned();
    }
    if let Some(zones) = cli.zones {
        config.zones_file = zones.to_string_lossy().into_owned();
    }
    if let Some(log) = cli.log {
        config.log_file = log.to_string_lossy().into_owned();
    }

    let source = JsonlDetectionSource::open(&config.detections_file)?;
    engine::run(config, source, ConsoleAlertSink).await?;
    Ok(())
}
