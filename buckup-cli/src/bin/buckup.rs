//! Interactive wizard: asks for a bucket name and options, then provisions the
//! bucket and its owner user.

use buckup_cli::args::BuckupCli;
use buckup_cli::{exit, logging, wizard};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = BuckupCli::parse();
    logging::init(cli.settings.verbose);
    exit::report(wizard::run(cli).await)
}
