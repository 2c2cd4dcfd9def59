//! Shared pieces of the `buckup` and `mkbucket` binaries

pub mod args;
pub mod exit;
pub mod logging;
pub mod oneshot;
pub mod output;
pub mod prompt;
pub mod signal;
pub mod wizard;
