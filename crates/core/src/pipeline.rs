use crate::capacity::{self, CapacityReport, DiskUsage};
use crate::cleanup;
use crate::config::{ManifestSpec, ShuffleConfig};
use crate::copier::{self, CopySummary};
use crate::error::Result;
use crate::prompt::{Confirm, Decision};
use crate::scanner::{self, NameFilter, SkipSet};
use crate::shuffle::{seeded_rng, Permutation};
use serde::Serialize;
use std::io::Write;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub scanned_bytes: u64,
    pub capacity: CapacityReport,
    pub copy: CopySummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Copied(RunSummary),
    Declined { files: usize },
}

/// Side-effecting collaborators of a run.
pub struct Runtime<'a> {
    pub disk: &'a dyn DiskUsage,
    pub confirm: &'a mut dyn Confirm,
    pub progress: &'a mut dyn Write,
}

/// Runs walk, capacity check, confirmation, shuffle and copy. Output artifacts
/// are removed when the user declines or any later stage fails.
pub fn run(config: &ShuffleConfig, rt: Runtime<'_>) -> Result<RunOutcome> {
    let manifest = config.validate()?;
    let filter = NameFilter::new(config.prefix.as_deref(), config.suffix.as_deref())?;
    config.prepare_output_dir()?;

    let result = execute(config, manifest.as_ref(), &filter, rt);
    match result {
        Ok(RunOutcome::Declined { files }) => {
            info!("declined, removing output");
            cleanup::remove_outputs(&config.output_dir, config.manifest_path())?;
            Ok(RunOutcome::Declined { files })
        }
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            warn!(error = %err, "run failed, removing output");
            if let Err(cleanup_err) =
                cleanup::remove_outputs(&config.output_dir, config.manifest_path())
            {
                error!(error = %err, "run failed before cleanup error");
                return Err(cleanup_err);
            }
            Err(err)
        }
    }
}

fn execute(
    config: &ShuffleConfig,
    manifest: Option<&ManifestSpec>,
    filter: &NameFilter,
    rt: Runtime<'_>,
) -> Result<RunOutcome> {
    info!(root = ?config.data_dir, "Starting scan phase...");
    // Outputs may sit under the data root; never read them back as sources.
    let skip = SkipSet::new(
        std::iter::once(config.output_dir.as_path()).chain(config.manifest_path()),
    );
    let scanned = scanner::scan(&config.data_dir, filter, &skip)?;
    info!(
        files = scanned.len(),
        bytes = scanned.total_bytes,
        "Scan complete."
    );

    let report = capacity::check(
        rt.disk,
        &config.output_dir,
        scanned.total_bytes,
        scanned.len(),
        config.min_free_bytes,
    )?;

    if rt.confirm.confirm(&report.prompt_message())? == Decision::Decline {
        return Ok(RunOutcome::Declined {
            files: scanned.len(),
        });
    }

    let (mut rng, seed) = seeded_rng(config.seed);
    let perm = Permutation::random(scanned.len(), &mut rng);
    info!(seed, "Starting copy phase...");
    let copy = copier::copy_all(
        &scanned.entries,
        &perm,
        &config.output_dir,
        manifest,
        rt.progress,
    )?;
    Ok(RunOutcome::Copied(RunSummary {
        seed,
        scanned_bytes: scanned.total_bytes,
        capacity: report,
        copy,
    }))
}
