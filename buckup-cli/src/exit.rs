//! Process exit codes

use buckup_core::ProvisionError;
use std::process::ExitCode;

pub const FAILURE: u8 = 1;
pub const CANCELLED: u8 = 130;

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::Cancelled)
        )
    })
}

/// Print the outcome of a run and turn it into an exit code.
pub fn report(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_cancelled(&err) => {
            eprintln!();
            eprintln!("Cancelled.");
            ExitCode::from(CANCELLED)
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            eprintln!("Aborted due to an error.");
            ExitCode::from(FAILURE)
        }
    }
}
