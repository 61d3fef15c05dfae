//! Economic Calendar CLI Application
//!
//! This is the command-line entry point for the daily calendar digest.
//! It uses the calendar-pipeline library and adds:
//! - Configuration loading (config.toml + JSON keyword dictionary)
//! - Page sources (HTTP or rendered snapshot file)
//! - Webhook delivery with a text fallback on failure
//!
//! Each invocation runs the pipeline once; scheduling is left to cron or a
//! similar trigger.

use anyhow::Result;
use calendar_pipeline::{pipeline, CalendarError, NotificationSink, PageSource};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

mod config;
mod source;
mod webhook;

/// Economic Calendar - Post today's high-impact events to a webhook
#[derive(Parser, Debug)]
#[command(name = "calendar-cli")]
#[command(about = "Scrape today's economic calendar and post a classified digest", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Read rendered markup from this file instead of the configured source
    #[arg(short, long, value_name = "FILE")]
    markup: Option<PathBuf>,

    /// Print the webhook payload instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Economic Calendar CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using pipeline library v{}", calendar_pipeline::VERSION);

    // Without a webhook URL there is nowhere to report failures, so this one is plain fatal
    let app_config = config::load_config(&args.config)?;
    log::debug!("Configuration loaded from {:?}", args.config);

    let sink: Box<dyn NotificationSink> = if args.dry_run {
        Box::new(webhook::StdoutSink)
    } else {
        Box::new(webhook::WebhookSink::new(
            app_config.notification.webhook_url.as_str(),
            Duration::from_secs(app_config.notification.timeout_secs),
        )?)
    };

    let dictionary = config::load_dictionary(&app_config.calendar.keywords)
        .map_err(|e| fatal(sink.as_ref(), e))?;
    let pipeline_config = app_config.pipeline_config(dictionary);

    let source: Box<dyn PageSource> = match &args.markup {
        Some(path) => Box::new(source::FilePageSource::new(path.clone())),
        None => source::from_config(&app_config.source).map_err(|e| fatal(sink.as_ref(), e))?,
    };

    let now = chrono::Utc::now().fixed_offset();
    let report = pipeline::run_with_fallback(source.as_ref(), sink.as_ref(), &pipeline_config, now)?;

    if !args.quiet {
        eprintln!(
            "✓ Done: {} events extracted, {} classified, {} blocks sent",
            report.extracted, report.classified, report.blocks_sent
        );
    }

    Ok(())
}

/// Report a startup failure through the sink, then hand the error back
fn fatal(sink: &dyn NotificationSink, err: anyhow::Error) -> anyhow::Error {
    pipeline::report_failure(sink, &CalendarError::Config(format!("{:#}", err)));
    err
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
