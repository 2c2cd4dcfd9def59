//! The flag-driven `mkbucket` front-end

use crate::args::MkbucketCli;
use crate::{output, prompt, signal};
use anyhow::{bail, Context, Result};
use buckup_core::{check_bucket_name, BucketProvisioner};
use log::info;

pub async fn run(cli: MkbucketCli) -> Result<()> {
    // Catch malformed names before any AWS configuration is loaded.
    check_bucket_name(&cli.bucket_name)?;

    if !cli.yes && !atty::is(atty::Stream::Stdin) {
        bail!("stdin is not a terminal; pass --yes to create the bucket without re-typing its name");
    }

    let provisioner =
        BucketProvisioner::from_environment(cli.aws.profile.as_deref(), cli.aws.region.as_deref())
            .await
            .with_settings(cli.settings.to_settings());
    let Some(region) = provisioner.configured_region() else {
        bail!("You need to specify your region with \"--region\".");
    };
    let request = cli.to_request(region);
    request.validate()?;

    if let Err(e) = provisioner.check_credentials().await {
        output::print_credentials_help();
        return Err(e.into());
    }
    provisioner.validate_bucket_name(&request.bucket_name).await?;
    provisioner.validate_user_name(&request.user_name).await?;

    if cli.yes {
        info!("Skipping confirmation for \"{}\"", request.bucket_name);
    } else {
        let answer = prompt::ask(&format!(
            "Do you want to create bucket \"{}\" in region \"{}\"? (Ctrl+C to cancel)\n\
             Type your bucket name again to proceed",
            request.bucket_name, request.region
        ))?;
        if answer.trim() != request.bucket_name {
            bail!("Incorrect.");
        }
    }

    let ctrl_c = signal::cancel_on_ctrl_c(provisioner.cancellation_token());
    let result = provisioner.provision(&request).await;
    ctrl_c.abort();

    let outcome = result.context("Failed to create the bucket")?;
    output::print_outcome(&outcome);
    Ok(())
}
