//! S3 bucket operations

use crate::aws::{from_sdk, AwsError, AwsResult};
use crate::synthesis::{CorsRule, PublicAccessBlock};
use crate::types::BucketAcl;
use aws_sdk_s3::client::Waiters;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{
    BucketCannedAcl, BucketLocationConstraint, BucketVersioningStatus, CorsConfiguration,
    CorsRule as S3CorsRule, CreateBucketConfiguration, PublicAccessBlockConfiguration,
    VersioningConfiguration,
};
use aws_sdk_s3::Client as S3Client;
use std::time::Duration;

pub(crate) async fn head_bucket(client: &S3Client, bucket: &str) -> AwsResult<()> {
    client
        .head_bucket()
        .bucket(bucket)
        .send()
        .await
        .map_err(|e| from_sdk("HeadBucket", e))?;
    Ok(())
}

pub(crate) async fn create_bucket(
    client: &S3Client,
    bucket: &str,
    location_constraint: Option<&str>,
    acl: Option<BucketAcl>,
) -> AwsResult<Option<String>> {
    let mut request = client.create_bucket().bucket(bucket);

    if let Some(region) = location_constraint {
        let config = CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build();
        request = request.create_bucket_configuration(config);
    }
    if let Some(acl) = acl {
        request = request.acl(BucketCannedAcl::from(acl.as_str()));
    }

    let output = request
        .send()
        .await
        .map_err(|e| from_sdk("CreateBucket", e))?;
    Ok(output.location().map(ToString::to_string))
}

pub(crate) async fn wait_until_bucket_exists(
    client: &S3Client,
    bucket: &str,
    timeout: Duration,
) -> AwsResult<()> {
    client
        .wait_until_bucket_exists()
        .bucket(bucket)
        .wait(timeout)
        .await
        .map_err(|e| AwsError::Waiter {
            operation: "BucketExists",
            message: DisplayErrorContext(&e).to_string(),
        })?;
    Ok(())
}

pub(crate) async fn put_bucket_policy(
    client: &S3Client,
    bucket: &str,
    policy: &str,
) -> AwsResult<()> {
    client
        .put_bucket_policy()
        .bucket(bucket)
        .policy(policy)
        .send()
        .await
        .map_err(|e| from_sdk("PutBucketPolicy", e))?;
    Ok(())
}

pub(crate) async fn put_public_access_block(
    client: &S3Client,
    bucket: &str,
    block: &PublicAccessBlock,
) -> AwsResult<()> {
    let config = PublicAccessBlockConfiguration::builder()
        .block_public_acls(block.block_public_acls)
        .ignore_public_acls(block.ignore_public_acls)
        .block_public_policy(block.block_public_policy)
        .restrict_public_buckets(block.restrict_public_buckets)
        .build();

    client
        .put_public_access_block()
        .bucket(bucket)
        .public_access_block_configuration(config)
        .send()
        .await
        .map_err(|e| from_sdk("PutPublicAccessBlock", e))?;
    Ok(())
}

pub(crate) async fn put_bucket_cors(client: &S3Client, bucket: &str, rule: &CorsRule) -> AwsResult<()> {
    let invalid = |e: aws_sdk_s3::error::BuildError| AwsError::Construction {
        operation: "PutBucketCors",
        message: e.to_string(),
    };

    let s3_rule = S3CorsRule::builder()
        .set_allowed_methods(Some(rule.allowed_methods.clone()))
        .set_allowed_headers(Some(rule.allowed_headers.clone()))
        .set_allowed_origins(Some(rule.allowed_origins.clone()))
        .max_age_seconds(rule.max_age_seconds)
        .build()
        .map_err(invalid)?;
    let config = CorsConfiguration::builder()
        .cors_rules(s3_rule)
        .build()
        .map_err(invalid)?;

    client
        .put_bucket_cors()
        .bucket(bucket)
        .cors_configuration(config)
        .send()
        .await
        .map_err(|e| from_sdk("PutBucketCors", e))?;
    Ok(())
}

pub(crate) async fn enable_versioning(client: &S3Client, bucket: &str) -> AwsResult<()> {
    let config = VersioningConfiguration::builder()
        .status(BucketVersioningStatus::Enabled)
        .build();

    client
        .put_bucket_versioning()
        .bucket(bucket)
        .versioning_configuration(config)
        .send()
        .await
        .map_err(|e| from_sdk("PutBucketVersioning", e))?;
    Ok(())
}
