mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use ffbatch_core::batch::{BatchRequest, BatchSession, BatchSummary};
use ffbatch_core::config::{ConfigManager, ConfigSection};
use ffbatch_core::logging::{init_tracing_with_file, log_channel, LogConfig, LogLevel, RunLogger};
use ffbatch_core::models::{JobInput, OperationMode};
use ffbatch_core::probe::ProbeService;
use ffbatch_core::process::ProcessRunner;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    config.ensure_dirs_exist()?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let _guard = init_tracing_with_file(level, &config.logs_folder())
        .context("initialising log file")?;
    tracing::info!(
        "ffbatch {} (config: {})",
        ffbatch_core::version(),
        config.path().display()
    );

    match cli.command {
        Commands::Run {
            folder,
            mode,
            args,
            regions,
            window,
            head,
            tail,
            json,
        } => {
            let input = JobInput {
                encoder_args: args.unwrap_or_default(),
                regions,
                window_seconds: window,
                head_seconds: head,
                tail_seconds: tail,
            };
            run_batch(&mut config, folder, mode, input, level, json)
        }
        Commands::Probe { file } => probe_file(&config, &file),
    }
}

fn run_batch(
    config: &mut ConfigManager,
    folder: PathBuf,
    mode: OperationMode,
    input: JobInput,
    level: LogLevel,
    json: bool,
) -> Result<()> {
    let settings = config.settings().clone();
    let poll = Duration::from_millis(settings.logging.poll_interval_ms.max(10));

    let session = BatchSession::new(settings, Arc::new(ProcessRunner::new()))
        .with_log_dir(config.logs_folder())
        .with_log_level(level);
    let handle = session.start(BatchRequest::new(&folder, mode, input))?;

    let mut last_percent = None;
    while !handle.is_finished() {
        print_lines(handle.drain_log(), json);

        let progress = handle.progress();
        if last_percent != Some(progress.percent()) {
            last_percent = Some(progress.percent());
            tracing::debug!("Progress {}% ({})", progress.percent(), progress.status);
        }
        thread::sleep(poll);
    }

    let (result, feed) = handle.join();
    print_lines(feed.drain(), json);
    let summary = result?;

    config.settings_mut().paths.last_folder = folder.display().to_string();
    if let Err(e) = config.update_section(ConfigSection::Paths) {
        tracing::warn!("Could not remember last folder: {}", e);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} file(s) failed",
            summary.failures.len(),
            summary.total
        );
    }
    Ok(())
}

/// Log lines go to stdout, or stderr when stdout carries JSON.
fn print_lines(lines: Vec<String>, json: bool) {
    for line in lines {
        if json {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

fn print_summary(summary: &BatchSummary) {
    println!();
    println!("Mode: {}", summary.mode);
    println!("Folder: {}", summary.folder.display());
    println!(
        "Files: {} ({} succeeded, {} failed)",
        summary.total,
        summary.succeeded,
        summary.failures.len()
    );
    for output in &summary.outputs {
        println!("  + {}", output.display());
    }
    for failure in &summary.failures {
        println!(
            "  ! {} [{}] {}",
            failure.file,
            failure.step.as_deref().unwrap_or("-"),
            failure.message
        );
    }
}

fn probe_file(config: &ConfigManager, file: &Path) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let settings = config.settings();
    let (sender, feed) = log_channel();
    let logger = RunLogger::to_feed("probe", LogConfig::from_settings(&settings.logging), sender);

    let probe = ProbeService::new(&settings.tools.ffprobe);
    let result = probe.duration(&ProcessRunner::new(), file, &logger);
    drop(logger);

    for line in feed.drain() {
        tracing::debug!("{}", line);
    }

    let duration = result?;
    println!("{}: {:.3}s", file.display(), duration);
    Ok(())
}
