use anyhow::{Context, Result};
use clap::Parser;
use cli::args::Cli;
use cli::exit;
use shuffler_core::capacity::FsDiskUsage;
use shuffler_core::config;
use shuffler_core::pipeline::{self, RunOutcome, Runtime};
use shuffler_core::prompt::{AssumeYes, Confirm, StdinPrompt};
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(outcome) => {
            let reported = report(&cli, &outcome);
            if let Err(e) = &reported {
                eprintln!("error: {e:#}");
            }
            ExitCode::from(exit::final_code(&outcome, &reported))
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit::error_code(&e))
        }
    }
}

fn run(cli: &Cli) -> Result<RunOutcome> {
    let base = config::load(cli.config.as_deref()).context("loading config")?;
    let cfg = cli.merge_into(base);
    debug!(?cfg, "effective configuration");

    let mut confirm: Box<dyn Confirm> = if cfg.assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinPrompt::new(
            cfg.confirm_timeout_secs.map(Duration::from_secs),
        ))
    };
    let outcome = pipeline::run(
        &cfg,
        Runtime {
            disk: &FsDiskUsage,
            confirm: confirm.as_mut(),
            progress: &mut io::stderr(),
        },
    )
    .with_context(|| format!("shuffling {:?} into {:?}", cfg.data_dir, cfg.output_dir))?;
    Ok(outcome)
}

fn report(cli: &Cli, outcome: &RunOutcome) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out).context("writing summary")?;
    if cli.json {
        let json = serde_json::to_string_pretty(outcome)?;
        writeln!(out, "{json}").context("writing summary")?;
        return out.flush().context("writing summary");
    }
    let written = match outcome {
        RunOutcome::Copied(summary) => writeln!(
            out,
            "copied {} files ({} bytes) into {} (seed {})",
            summary.copy.files,
            summary.copy.bytes,
            summary.copy.output_dir.display(),
            summary.seed
        ),
        RunOutcome::Declined { files } => {
            writeln!(out, "declined; {files} files left uncopied, output removed")
        }
    };
    written
        .and_then(|_| out.flush())
        .context("writing summary")
}
