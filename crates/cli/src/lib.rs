//! Public library modules for the CLI crate
pub mod args;
pub mod exit;
