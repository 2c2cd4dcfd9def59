//! Command-line arguments for both front-ends

use buckup_core::{
    default_policy_name, BucketAcl, PolicyRetry, ProvisionRequest, ProvisionSettings, Region,
};
use clap::{ArgAction, Args, Parser};
use std::time::Duration;

/// Where AWS credentials and region come from.
#[derive(Args, Debug, Clone)]
pub struct AwsArgs {
    /// AWS CLI profile you want to use
    #[arg(long)]
    pub profile: Option<String>,

    /// Region to host the bucket in. Defaults to the region of the local AWS configuration.
    #[arg(long)]
    pub region: Option<String>,
}

/// Timing of the provisioning sequence, plus log verbosity.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Seconds between bucket policy attempts while the new user propagates
    #[arg(
        long,
        env = "BUCKUP_POLICY_RETRY_INTERVAL_SECS",
        default_value_t = 5,
        value_name = "SECS"
    )]
    pub policy_retry_interval_secs: u64,

    /// Maximum bucket policy attempts (0 retries until the user propagates)
    #[arg(
        long,
        env = "BUCKUP_POLICY_RETRY_ATTEMPTS",
        default_value_t = 60,
        value_name = "N"
    )]
    pub policy_retry_attempts: u32,

    /// Seconds to wait for the new bucket and user to become visible
    #[arg(
        long,
        env = "BUCKUP_WAIT_TIMEOUT_SECS",
        default_value_t = 60,
        value_name = "SECS"
    )]
    pub wait_timeout_secs: u64,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl SettingsArgs {
    pub fn to_settings(&self) -> ProvisionSettings {
        let wait = Duration::from_secs(self.wait_timeout_secs);
        ProvisionSettings {
            bucket_wait_timeout: wait,
            user_wait_timeout: wait,
            policy_retry: PolicyRetry {
                interval: Duration::from_secs(self.policy_retry_interval_secs),
                max_attempts: (self.policy_retry_attempts != 0)
                    .then_some(self.policy_retry_attempts),
            },
        }
    }
}

/// Create S3 bucket with user ready to use on your website.
#[derive(Parser, Debug)]
#[command(name = "buckup", version, about, long_about = None)]
pub struct BuckupCli {
    #[command(flatten)]
    pub aws: AwsArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Create S3 bucket with user.
#[derive(Parser, Debug)]
#[command(name = "mkbucket", version, about, long_about = None)]
pub struct MkbucketCli {
    /// Name of the bucket you want to create
    #[arg(value_name = "bucket-name")]
    pub bucket_name: String,

    #[command(flatten)]
    pub aws: AwsArgs,

    /// Enable file versioning. Please consider using on production only.
    #[arg(long)]
    pub enable_versioning: bool,

    /// Inline policy put on the user. Defaults to "<bucket-name>-s3-owner-policy".
    #[arg(long)]
    pub policy_name: Option<String>,

    /// IAM user to create. Defaults to "<bucket-name>-s3-owner".
    #[arg(long)]
    pub user_name: Option<String>,

    /// Canned ACL to create the bucket with
    #[arg(long, value_name = "ACL")]
    pub bucket_acl: Option<BucketAcl>,

    /// Origin allowed to GET objects through CORS. Repeat for multiple origins.
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    pub cors_origins: Vec<String>,

    /// Path the public may read, e.g. "images/*", or "*" for the whole bucket. Repeatable.
    #[arg(long = "public-path", value_name = "PATH")]
    pub public_paths: Vec<String>,

    /// Allow public ACLs on individual objects
    #[arg(long)]
    pub allow_public_acls: bool,

    /// Skip re-typing the bucket name before anything is created
    #[arg(short, long)]
    pub yes: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

impl MkbucketCli {
    /// The request this invocation describes. Not validated yet.
    pub fn to_request(&self, region: Region) -> ProvisionRequest {
        let mut request = ProvisionRequest::new(self.bucket_name.clone(), region)
            .with_public_paths(&self.public_paths);
        if let Some(user_name) = &self.user_name {
            request.user_name = user_name.clone();
        }
        request.enable_versioning = self.enable_versioning;
        request.allow_public_acls = self.allow_public_acls;
        request.cors_origins = self.cors_origins.clone();
        request.bucket_acl = self.bucket_acl;
        request.inline_policy_name = Some(
            self.policy_name
                .clone()
                .unwrap_or_else(|| default_policy_name(&self.bucket_name)),
        );
        request
    }
}
