//! Free-space check performed before anything is copied.

use crate::error::{Result, ShuffleError};
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::debug;

const GIB: f64 = (1u64 << 30) as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskStatus {
    pub total: u64,
    pub free: u64,
}

/// Source of filesystem usage figures for a path.
pub trait DiskUsage {
    fn usage(&self, path: &Path) -> io::Result<DiskStatus>;
}

/// statvfs-backed usage of the filesystem holding the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDiskUsage;

impl DiskUsage for FsDiskUsage {
    fn usage(&self, path: &Path) -> io::Result<DiskStatus> {
        let stats = fs2::statvfs(path)?;
        Ok(DiskStatus {
            total: stats.total_space(),
            free: stats.free_space(),
        })
    }
}

/// Fixed figures, handy where the real filesystem should not matter.
#[derive(Debug, Clone, Copy)]
pub struct StaticDiskUsage(pub DiskStatus);

impl DiskUsage for StaticDiskUsage {
    fn usage(&self, _path: &Path) -> io::Result<DiskStatus> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityReport {
    pub disk: DiskStatus,
    pub predicted_free: u64,
    pub files: usize,
}

impl CapacityReport {
    pub fn predicted_free_gib(&self) -> f64 {
        self.predicted_free as f64 / GIB
    }

    pub fn total_gib(&self) -> f64 {
        self.disk.total as f64 / GIB
    }

    pub fn prompt_message(&self) -> String {
        format!(
            "Disk capacity will be {:.2}/{:.2}(GB)(file num: {}). Do you continue? [Y/N]",
            self.predicted_free_gib(),
            self.total_gib(),
            self.files
        )
    }
}

/// Refuses the run when `free - bytes` would drop below `min_free`.
pub fn evaluate(disk: DiskStatus, bytes: u64, files: usize, min_free: u64) -> Result<CapacityReport> {
    let predicted_free = disk.free.saturating_sub(bytes);
    debug!(free = disk.free, bytes, predicted_free, "capacity evaluated");
    if predicted_free < min_free {
        return Err(ShuffleError::Capacity {
            predicted_free,
            required: min_free,
        });
    }
    Ok(CapacityReport {
        disk,
        predicted_free,
        files,
    })
}

pub fn check(
    usage: &dyn DiskUsage,
    target: &Path,
    bytes: u64,
    files: usize,
    min_free: u64,
) -> Result<CapacityReport> {
    let disk = usage
        .usage(target)
        .map_err(|source| ShuffleError::Filesystem {
            path: target.to_path_buf(),
            source,
        })?;
    evaluate(disk, bytes, files, min_free)
}
