use shuffler_core::pipeline::RunOutcome;
use shuffler_core::{ExitStatus, ShuffleError};

pub fn outcome_code(outcome: &RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Copied(_) => ExitStatus::Success.code(),
        RunOutcome::Declined { .. } => ExitStatus::Declined.code(),
    }
}

/// Exit code once the summary has been printed. A summary that could not be
/// written turns the run's code into an io error.
pub fn final_code(outcome: &RunOutcome, reported: &anyhow::Result<()>) -> u8 {
    match reported {
        Ok(()) => outcome_code(outcome),
        Err(_) => ExitStatus::IoError.code(),
    }
}

/// Exit code for a failed run. Errors not raised by the pipeline count as config errors.
pub fn error_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<ShuffleError>())
        .map(ShuffleError::exit_code)
        .unwrap_or_else(|| ExitStatus::ConfigError.code())
}
