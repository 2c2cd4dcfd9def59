//! This crate provides the core logic behind buckup:
//! - Bucket and IAM user name validation
//! - Bucket policy, public access block and CORS synthesis
//! - The provisioning sequence against S3, IAM and STS
//!

mod aws;
pub mod commands;
mod error;
mod synthesis;
mod types;

// Re-exports for a small, focused public API
pub use aws::client::AwsCloudClient;
pub use aws::naming::{
    check_bucket_name, check_policy_name, check_user_name, default_policy_name, default_user_name,
    USER_NAME_SUFFIX,
};
pub use aws::{AwsError, AwsResult, CloudApi};
pub use commands::BucketProvisioner;
pub use error::{NameKind, ProvisionError, ProvisionResult};
pub use synthesis::policy_builder::{
    CORS_MAX_AGE_SECONDS, FULL_BUCKET_ACCESS_SID, PUBLIC_GET_OBJECT_SID, USER_MANAGE_BUCKET_SID,
    USER_MANAGE_OBJECTS_SID,
};
pub use synthesis::{
    build_bucket_policy, build_cors_rule, build_owner_inline_policy, bucket_arn,
    object_resource_arn, public_access_block, CorsRule, PublicAccessBlock,
};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    check_public_paths, normalize_paths, ActionType, Bucket, BucketAcl, CallerIdentity,
    CreatedResources, Keypair, PolicyDocument, PolicyRetry, Principal, ProvisionOutcome,
    ProvisionRequest, ProvisionSettings, Region, ResourceType, Statement, User, DEFAULT_REGION,
    POLICY_VERSION, WILDCARD_PATH,
};
