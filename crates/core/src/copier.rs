//! Copies accepted files to their shuffled names and writes manifest lines.

use crate::config::ManifestSpec;
use crate::error::{Result, ShuffleError};
use crate::scanner::FileEntry;
use crate::shuffle::Permutation;
use serde::Serialize;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize)]
pub struct CopySummary {
    pub files: usize,
    pub bytes: u64,
    pub output_dir: PathBuf,
    pub manifest: Option<PathBuf>,
}

/// Absolute form of `dir`, resolved against the current directory with `.`
/// components dropped. `..` is kept as written.
pub fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    let base = if dir.is_absolute() {
        PathBuf::new()
    } else {
        env::current_dir().map_err(|e| ShuffleError::io(dir, e))?
    };
    Ok(dir
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .fold(base, |acc, c| acc.join(c)))
}

pub fn destination(dir: &Path, index: usize, ext: &str) -> PathBuf {
    dir.join(format!("{index}{ext}"))
}

struct ManifestWriter {
    path: PathBuf,
    label: String,
    out: BufWriter<File>,
}

impl ManifestWriter {
    fn create(spec: &ManifestSpec) -> Result<Self> {
        let file = File::create(&spec.path).map_err(|e| ShuffleError::io(&spec.path, e))?;
        Ok(Self {
            path: spec.path.clone(),
            label: spec.label.clone(),
            out: BufWriter::new(file),
        })
    }

    fn record(&mut self, dest: &Path) -> Result<()> {
        writeln!(self.out, "{} {}", dest.display(), self.label)
            .map_err(|e| ShuffleError::io(&self.path, e))
    }

    fn finish(mut self) -> Result<PathBuf> {
        self.out
            .flush()
            .map_err(|e| ShuffleError::io(&self.path, e))?;
        Ok(self.path)
    }
}

/// Copies `entries[i]` to `<perm[i]><ext>` under `output_dir`, writing a manifest
/// line before each copy when `manifest` is set. Stops at the first failure.
pub fn copy_all(
    entries: &[FileEntry],
    perm: &Permutation,
    output_dir: &Path,
    manifest: Option<&ManifestSpec>,
    progress: &mut dyn Write,
) -> Result<CopySummary> {
    let output_dir = absolute_dir(output_dir)?;
    let mut writer = manifest.map(ManifestWriter::create).transpose()?;
    let total = entries.len();
    let mut summary = CopySummary {
        output_dir: output_dir.clone(),
        ..CopySummary::default()
    };

    for (i, entry) in entries.iter().enumerate() {
        let index = perm.get(i).ok_or_else(|| {
            ShuffleError::Config(format!(
                "permutation covers {} files, {} scanned",
                perm.len(),
                total
            ))
        })?;
        let dest = destination(&output_dir, index, &entry.ext);
        if let Some(w) = writer.as_mut() {
            w.record(&dest)?;
        }
        summary.bytes += copy_file(&entry.path, &dest)?;
        summary.files += 1;
        debug!(src = ?entry.path, dest = ?dest, "copied");
        if let Err(e) = write!(progress, "\r{:.1}%...", percent(i + 1, total))
            .and_then(|_| progress.flush())
        {
            debug!(error = %e, "progress write failed");
        }
    }

    if let Some(w) = writer {
        summary.manifest = Some(w.finish()?);
    }
    info!(files = summary.files, bytes = summary.bytes, "copy finished");
    Ok(summary)
}

fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    done as f64 / total as f64 * 100.0
}

fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    let mut input = File::open(src).map_err(|e| ShuffleError::io(src, e))?;
    let mut output = File::create(dst).map_err(|e| ShuffleError::io(dst, e))?;
    io::copy(&mut input, &mut output).map_err(|e| ShuffleError::io(dst, e))
}
