//! The interactive `buckup` front-end

use crate::args::BuckupCli;
use crate::{output, prompt, signal};
use anyhow::{bail, Context, Result};
use buckup_core::{
    check_public_paths, default_user_name, normalize_paths, BucketProvisioner, ProvisionError,
    ProvisionRequest, WILDCARD_PATH,
};
use log::debug;

pub async fn run(cli: BuckupCli) -> Result<()> {
    if !atty::is(atty::Stream::Stdin) {
        bail!("buckup asks questions on the terminal; use mkbucket for non-interactive runs");
    }

    output::print_banner();
    output::print_separator();

    let provisioner =
        BucketProvisioner::from_environment(cli.aws.profile.as_deref(), cli.aws.region.as_deref())
            .await
            .with_settings(cli.settings.to_settings());

    if let Err(e) = provisioner.check_credentials().await {
        output::print_credentials_help();
        return Err(e.into());
    }
    let identity = provisioner.get_current_identity().await;
    let alias = provisioner.get_account_alias().await;
    let Some(region) = provisioner.configured_region() else {
        bail!("You need to specify region with \"--region\".");
    };
    for line in output::account_lines(identity.as_ref(), alias.as_deref(), &region) {
        println!("{line}");
    }
    output::print_separator();

    let bucket_name = ask_bucket_name(&provisioner).await?;
    let mut request = ProvisionRequest::new(bucket_name, region);
    request.user_name = ask_user_name(&provisioner, &request.bucket_name).await?;
    request.enable_versioning = prompt::ask_yes_no("Do you want to enable versioning?")?;
    request.public_get_object_paths = ask_public_paths()?;
    request.allow_public_acls = prompt::ask_yes_no(
        "Do you want to allow public ACLs on objects?\n\
         This allows access to individual objects to be controlled separately from the bucket policy.",
    )?;
    request.cors_origins = prompt::split_comma_list(&prompt::ask(
        "Specify a comma separated list of origins whitelisted for the CORS,\n\
         e.g. \"https://example.com\" (not required)",
    )?);
    request.validate()?;

    output::print_separator();
    output::print_summary(&request);
    if !prompt::ask_yes_no("Do you want to create a bucket with the above details?")? {
        return Err(ProvisionError::Cancelled.into());
    }
    output::print_separator();

    let ctrl_c = signal::cancel_on_ctrl_c(provisioner.cancellation_token());
    let result = provisioner.provision(&request).await;
    ctrl_c.abort();

    let outcome = result.context("Failed to create the bucket")?;
    output::print_outcome(&outcome);
    Ok(())
}

async fn ask_bucket_name(provisioner: &BucketProvisioner) -> Result<String> {
    loop {
        let name = prompt::ask("Bucket name?")?.trim().to_string();
        match provisioner.validate_bucket_name(&name).await {
            Ok(()) => return Ok(name),
            Err(e) if e.is_name_rejection() => {
                debug!("Rejected bucket name: {e:?}");
                println!("{e}. Try a different one.");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn ask_user_name(provisioner: &BucketProvisioner, bucket_name: &str) -> Result<String> {
    let default = default_user_name(bucket_name);
    loop {
        let name = prompt::ask_with_default("Username?", &default)?
            .trim()
            .to_string();
        match provisioner.validate_user_name(&name).await {
            Ok(()) => return Ok(name),
            Err(e) if e.is_name_rejection() => {
                debug!("Rejected user name: {e:?}");
                println!("{e}. Try a different one.");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn ask_public_paths() -> Result<Vec<String>> {
    let wanted = prompt::ask_yes_no(
        "Do you want to specify paths that you want to be publicly\n\
         accessible with a link? This will give the \"s3:GetObject\"\n\
         permission to the public on the list of paths you set.",
    )?;
    if !wanted {
        return Ok(Vec::new());
    }
    loop {
        let answer = prompt::ask(&format!(
            "What paths do you want to allow the public to perform s3:GetObject on?\n\
             Please provide comma separated list of paths, e.g. \"documents/*,images/*\" or\n\
             use \"{WILDCARD_PATH}\" to indicate the whole bucket."
        ))?;
        let paths = normalize_paths(prompt::split_comma_list(&answer));
        if paths.is_empty() {
            continue;
        }
        match check_public_paths(&paths) {
            Ok(()) => return Ok(paths),
            Err(e) => println!("{e}\n"),
        }
    }
}
