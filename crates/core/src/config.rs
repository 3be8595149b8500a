use crate::error::{Result, ShuffleError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Predicted free space below which a run is refused (30 GB, decimal).
pub const DEFAULT_MIN_FREE_BYTES: u64 = 30_000_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuffleConfig {
    #[serde(alias = "output")]
    pub output_dir: PathBuf,
    #[serde(alias = "datadir")]
    pub data_dir: PathBuf,
    #[serde(alias = "txt")]
    pub manifest: bool,
    pub label: Option<String>,
    #[serde(alias = "txtfname")]
    pub manifest_file: Option<PathBuf>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub min_free_bytes: u64,
    pub seed: Option<u64>,
    pub confirm_timeout_secs: Option<u64>,
    pub assume_yes: bool,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            data_dir: PathBuf::from("./"),
            manifest: false,
            label: None,
            manifest_file: None,
            prefix: None,
            suffix: None,
            min_free_bytes: DEFAULT_MIN_FREE_BYTES,
            seed: None,
            confirm_timeout_secs: None,
            assume_yes: false,
        }
    }
}

/// Where manifest lines go and which label they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSpec {
    pub path: PathBuf,
    pub label: String,
}

impl ShuffleConfig {
    /// Checks manifest options. Returns the manifest target when enabled.
    pub fn validate(&self) -> Result<Option<ManifestSpec>> {
        if !self.manifest {
            return Ok(None);
        }
        let label = self.label.as_deref().unwrap_or("");
        let path = self
            .manifest_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty());
        match (label.is_empty(), path) {
            (false, Some(path)) => Ok(Some(ManifestSpec {
                path: path.to_path_buf(),
                label: label.to_string(),
            })),
            _ => Err(ShuffleError::Config(
                "label or manifest file name is not defined".into(),
            )),
        }
    }

    /// Creates the output directory tree if it does not exist yet.
    pub fn prepare_output_dir(&self) -> Result<()> {
        create_output_dir(&self.output_dir)
    }

    /// Manifest path if manifest mode is on, regardless of label validity.
    pub fn manifest_path(&self) -> Option<&Path> {
        if self.manifest {
            self.manifest_file.as_deref()
        } else {
            None
        }
    }
}

fn create_output_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| ShuffleError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads defaults from an optional TOML file and `SHUFFLER_*` environment
/// variables. Without an explicit path, `config/default.toml` is used if present.
pub fn load(path: Option<&str>) -> Result<ShuffleConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("SHUFFLER").try_parsing(true));
    let cfg = settings
        .build()
        .map_err(|e| ShuffleError::Config(e.to_string()))?;
    cfg.try_deserialize()
        .map_err(|e| ShuffleError::Config(e.to_string()))
}
