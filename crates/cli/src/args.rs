use clap::Parser;
use shuffler_core::config::ShuffleConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dataset-shuffler")]
#[command(about = "Shuffle-copy a dataset tree into numbered files", long_about = None)]
pub struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output dir (default: output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory of datasets (default: ./)
    #[arg(short, long)]
    pub datadir: Option<PathBuf>,

    /// Write a manifest text file
    #[arg(short, long, default_value_t = false)]
    pub txt: bool,

    /// Label of the dataset
    #[arg(short, long)]
    pub label: Option<String>,

    /// Name of the manifest text file
    #[arg(short = 'f', long)]
    pub txtfname: Option<PathBuf>,

    /// Basename prefix regex
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Basename suffix regex
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long, default_value_t = false)]
    pub yes: bool,

    /// Fixed shuffle seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Seconds to wait for an answer before declining
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Minimum free space (decimal GB) that must remain after the copy
    #[arg(long)]
    pub min_free_gb: Option<f64>,

    /// Output JSON summary
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Overlays flags given on the command line on top of `base`.
    pub fn merge_into(&self, mut base: ShuffleConfig) -> ShuffleConfig {
        if let Some(o) = &self.output {
            base.output_dir = o.clone();
        }
        if let Some(d) = &self.datadir {
            base.data_dir = d.clone();
        }
        base.manifest |= self.txt;
        if self.label.is_some() {
            base.label = self.label.clone();
        }
        if self.txtfname.is_some() {
            base.manifest_file = self.txtfname.clone();
        }
        if self.prefix.is_some() {
            base.prefix = self.prefix.clone();
        }
        if self.suffix.is_some() {
            base.suffix = self.suffix.clone();
        }
        base.assume_yes |= self.yes;
        if self.seed.is_some() {
            base.seed = self.seed;
        }
        if self.timeout.is_some() {
            base.confirm_timeout_secs = self.timeout;
        }
        if let Some(gb) = self.min_free_gb {
            base.min_free_bytes = (gb.max(0.0) * 1e9) as u64;
        }
        base
    }
}
