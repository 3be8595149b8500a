//! Error kinds surfaced by the shuffle pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShuffleError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to create output directory {path:?}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "shortage of disk capacity: {predicted_free} bytes would remain, at least {required} required"
    )]
    Capacity { predicted_free: u64, required: u64 },
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to clean up {path:?}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ShuffleError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ShuffleError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        let status = match self {
            ShuffleError::Config(_) | ShuffleError::CreateOutput { .. } => ExitStatus::ConfigError,
            ShuffleError::Filesystem { .. } => ExitStatus::FilesystemError,
            ShuffleError::Capacity { .. } => ExitStatus::CapacityError,
            ShuffleError::Io { .. } => ExitStatus::IoError,
            ShuffleError::Cleanup { .. } => ExitStatus::CleanupError,
        };
        status.code()
    }
}

/// Outcome taxonomy reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Declined,
    ConfigError,
    FilesystemError,
    CapacityError,
    IoError,
    CleanupError,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Declined => 1,
            ExitStatus::ConfigError => 2,
            ExitStatus::FilesystemError => 3,
            ExitStatus::CapacityError => 4,
            ExitStatus::IoError => 5,
            ExitStatus::CleanupError => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShuffleError>;
