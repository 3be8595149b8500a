//! Core library: scanning, capacity checks, confirmation, shuffling, copying, cleanup.

pub mod capacity;
pub mod cleanup;
pub mod config;
pub mod copier;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod scanner;
pub mod shuffle;

pub use error::{ExitStatus, Result, ShuffleError};
