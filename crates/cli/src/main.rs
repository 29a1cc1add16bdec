mod args;
mod logging;
mod summary;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use regex_lite::Regex;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use flac2mp3_core::{
    discover,
    dispatcher::{EXIT_CONFIG, EXIT_SUCCESS},
    load_config, plan_tasks, validate_config, Converter, Dispatcher, EncodingOptions, JobFailure,
    LameConverter, ListSource, OutputLayout,
};

use args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    let _guard = match logging::init_logging(quiet, cli.log.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("flac2mp3: {:#}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            if quiet {
                eprintln!("flac2mp3: {:#}", e);
            }
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

/// Runs one batch. Errors returned from here are configuration errors
/// raised before anything is dispatched; job problems end up in the summary.
async fn run(cli: Cli) -> Result<u8> {
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    validate_config(&config).context("Configuration validation failed")?;

    let options =
        EncodingOptions::from_flags(cli.quality_flags(), cli.overwrite || config.batch.overwrite)
            .context("Invalid encoding options")?;
    let workers = cli
        .workers
        .map(usize::from)
        .unwrap_or(config.batch.workers);
    let copy_pattern = cli
        .copy_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("Invalid copy pattern")?;
    let strip_chars = cli
        .strip_chars
        .clone()
        .unwrap_or_else(|| config.batch.strip_chars.clone());

    let converter = LameConverter::new(config.tools.clone());
    converter
        .validate()
        .await
        .context("Required tools are not available")?;

    let output_dir = cli
        .output_dir
        .as_deref()
        .map(prepare_output_dir)
        .transpose()?;
    let root_dir = cli
        .root_dir
        .as_deref()
        .map(|dir| {
            std::fs::canonicalize(dir).with_context(|| format!("Invalid root directory {:?}", dir))
        })
        .transpose()?;

    let mut inputs = cli.files.clone();
    let mut list_errors = Vec::new();
    if let Some(list) = cli.file.as_deref() {
        match ListSource::from_arg(list).read() {
            Ok(paths) => inputs.extend(paths),
            Err(e) => {
                error!("{}", e);
                list_errors.push(JobFailure::new(e.path(), &e));
            }
        }
    }

    let discovery = discover(&inputs, copy_pattern.as_ref());
    for e in &discovery.errors {
        warn!("{}", e);
    }
    if discovery.is_empty() {
        warn!("No FLAC files found in {} inputs", inputs.len());
    } else {
        info!(
            "Found {} FLAC files ({} companions) in {} inputs",
            discovery.files.len(),
            discovery.companions.len(),
            inputs.len()
        );
    }

    let layout =
        OutputLayout::plan(output_dir, root_dir, &discovery.anchors).with_strip_chars(&strip_chars);
    if let Some(root) = layout.root() {
        info!("Mirroring {:?} into {:?}", root, layout.output_dir());
    }
    info!("Encoding with {}", options.mode());

    let mut plan = plan_tasks(discovery, &layout, &options);
    plan.rejected.extend(list_errors);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Interrupt received, stopping");
        let _ = cancel_tx.send(true);
    });

    let dispatcher = Dispatcher::new(Arc::new(converter), workers).with_cancellation(cancel_rx);
    info!("Using up to {} workers", dispatcher.workers());
    let mut summary = dispatcher.run(plan.tasks).await;
    for failure in plan.rejected {
        summary.reject(failure);
    }

    print!("{}", summary::render(&summary));
    let code = summary.exit_code();
    if code != EXIT_SUCCESS {
        info!("Exiting with status {}", code);
    }
    Ok(code)
}

fn prepare_output_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {:?}", dir))?;
    std::fs::canonicalize(dir).with_context(|| format!("Invalid output directory {:?}", dir))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
