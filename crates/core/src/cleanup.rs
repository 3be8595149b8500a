use crate::error::{Result, ShuffleError};
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// Removes the output tree and, if given, the manifest file. Targets that are
/// already gone are skipped.
pub fn remove_outputs(output_dir: &Path, manifest: Option<&Path>) -> Result<()> {
    ignore_missing(output_dir, fs::remove_dir_all(output_dir))?;
    if let Some(manifest) = manifest {
        ignore_missing(manifest, fs::remove_file(manifest))?;
    }
    info!(output = ?output_dir, manifest = ?manifest, "removed run outputs");
    Ok(())
}

fn ignore_missing(path: &Path, res: io::Result<()>) -> Result<()> {
    match res {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(ShuffleError::Cleanup {
            path: path.to_path_buf(),
            source: e,
        }),
        _ => Ok(()),
    }
}
