//! One-shot bucket and owner user creation driven by flags.

use buckup_cli::args::MkbucketCli;
use buckup_cli::{exit, logging, oneshot};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = MkbucketCli::parse();
    logging::init(cli.settings.verbose);
    exit::report(oneshot::run(cli).await)
}
