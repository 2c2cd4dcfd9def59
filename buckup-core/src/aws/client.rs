//! SDK-backed [`CloudApi`] implementation

use crate::aws::{iam_client, s3_client, sts, AwsError, AwsResult, CloudApi};
use crate::synthesis::{CorsRule, PublicAccessBlock};
use crate::types::{BucketAcl, CallerIdentity, Keypair, Region, User};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sts::Client as StsClient;
use log::debug;
use std::time::Duration;

/// S3, IAM and STS clients built from one shared SDK configuration.
pub struct AwsCloudClient {
    config: SdkConfig,
    s3: S3Client,
    iam: IamClient,
    sts: StsClient,
}

impl AwsCloudClient {
    /// Load configuration through the standard credential and region provider chain.
    ///
    /// `profile` and `region` override what the chain would otherwise pick.
    pub async fn load(profile: Option<&str>, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = loader.load().await;
        debug!(
            "Loaded AWS configuration (profile: {}, region: {:?})",
            profile.unwrap_or("default"),
            config.region()
        );
        Self::from_config(config)
    }

    pub fn from_config(config: SdkConfig) -> Self {
        Self {
            s3: S3Client::new(&config),
            iam: IamClient::new(&config),
            sts: StsClient::new(&config),
            config,
        }
    }

    /// Region the clients were configured with, if the chain resolved one.
    pub fn region(&self) -> Option<Region> {
        self.config
            .region()
            .map(|region| Region::new(region.as_ref()))
    }
}

#[async_trait]
impl CloudApi for AwsCloudClient {
    async fn check_credentials(&self) -> AwsResult<()> {
        let provider = self.config.credentials_provider().ok_or_else(|| {
            AwsError::Credentials("no credentials provider is configured".to_string())
        })?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| AwsError::Credentials(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn caller_identity(&self) -> AwsResult<CallerIdentity> {
        sts::caller_identity(&self.sts).await
    }

    async fn account_aliases(&self) -> AwsResult<Vec<String>> {
        iam_client::list_account_aliases(&self.iam).await
    }

    async fn head_bucket(&self, bucket: &str) -> AwsResult<()> {
        s3_client::head_bucket(&self.s3, bucket).await
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
        acl: Option<BucketAcl>,
    ) -> AwsResult<Option<String>> {
        s3_client::create_bucket(&self.s3, bucket, location_constraint, acl).await
    }

    async fn wait_until_bucket_exists(&self, bucket: &str, timeout: Duration) -> AwsResult<()> {
        s3_client::wait_until_bucket_exists(&self.s3, bucket, timeout).await
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> AwsResult<()> {
        s3_client::put_bucket_policy(&self.s3, bucket, policy).await
    }

    async fn put_public_access_block(
        &self,
        bucket: &str,
        block: &PublicAccessBlock,
    ) -> AwsResult<()> {
        s3_client::put_public_access_block(&self.s3, bucket, block).await
    }

    async fn put_bucket_cors(&self, bucket: &str, rule: &CorsRule) -> AwsResult<()> {
        s3_client::put_bucket_cors(&self.s3, bucket, rule).await
    }

    async fn enable_versioning(&self, bucket: &str) -> AwsResult<()> {
        s3_client::enable_versioning(&self.s3, bucket).await
    }

    async fn get_user(&self, user_name: &str) -> AwsResult<User> {
        iam_client::get_user(&self.iam, user_name).await
    }

    async fn create_user(&self, user_name: &str) -> AwsResult<User> {
        iam_client::create_user(&self.iam, user_name).await
    }

    async fn wait_until_user_exists(&self, user_name: &str, timeout: Duration) -> AwsResult<()> {
        iam_client::wait_until_user_exists(&self.iam, user_name, timeout).await
    }

    async fn create_access_key(&self, user_name: &str) -> AwsResult<Keypair> {
        iam_client::create_access_key(&self.iam, user_name).await
    }

    async fn put_user_policy(
        &self,
        user_name: &str,
        policy_name: &str,
        policy: &str,
    ) -> AwsResult<()> {
        iam_client::put_user_policy(&self.iam, user_name, policy_name, policy).await
    }
}
