//! Bucket policy, public-access-block and CORS synthesis

use crate::error::{ProvisionError, ProvisionResult};
use crate::types::{
    ActionType, Bucket, PolicyDocument, Principal, ResourceType, Statement, User, POLICY_VERSION,
};

pub const PUBLIC_GET_OBJECT_SID: &str = "PublicGetObject";
pub const USER_MANAGE_BUCKET_SID: &str = "AllowUserManageBucket";
pub const USER_MANAGE_OBJECTS_SID: &str = "AllowUserManageBucketObjects";
pub const FULL_BUCKET_ACCESS_SID: &str = "AllowFullBucketAccess";

const BUCKET_LEVEL_ACTIONS: [&str; 4] = [
    "s3:ListBucket",
    "s3:GetBucketLocation",
    "s3:ListBucketMultipartUploads",
    "s3:ListBucketVersions",
];

pub const CORS_MAX_AGE_SECONDS: i32 = 3000;

/// `arn:<partition>:s3:::<bucket>`
pub fn bucket_arn(bucket: &Bucket) -> String {
    format!("arn:{}:s3:::{}", bucket.region.partition(), bucket.name)
}

/// `arn:<partition>:s3:::<bucket>/<path>` with at most one leading `/` removed.
pub fn object_resource_arn(bucket: &Bucket, path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", bucket_arn(bucket), path)
}

fn allow(sid: &str, principal: Principal, action: ActionType, resource: ResourceType) -> Statement {
    Statement {
        sid: sid.to_string(),
        effect: "Allow".to_string(),
        principal: Some(principal),
        action,
        resource,
    }
}

/// Build the bucket policy: optional public read on `public_paths`, then bucket-level
/// and object-level access for the owner user. Statement order is fixed.
pub fn build_bucket_policy(bucket: &Bucket, user: &User, public_paths: &[String]) -> PolicyDocument {
    let mut statement = Vec::with_capacity(3);

    if !public_paths.is_empty() {
        let resources = public_paths
            .iter()
            .map(|path| object_resource_arn(bucket, path))
            .collect();
        statement.push(allow(
            PUBLIC_GET_OBJECT_SID,
            Principal::everyone(),
            ActionType::Multiple(vec!["s3:GetObject".to_string()]),
            ResourceType::Multiple(resources),
        ));
    }

    statement.push(allow(
        USER_MANAGE_BUCKET_SID,
        Principal::aws(&user.arn),
        ActionType::Multiple(BUCKET_LEVEL_ACTIONS.iter().map(|a| a.to_string()).collect()),
        ResourceType::Single(bucket_arn(bucket)),
    ));

    statement.push(allow(
        USER_MANAGE_OBJECTS_SID,
        Principal::aws(&user.arn),
        ActionType::Multiple(vec!["s3:*".to_string()]),
        ResourceType::Single(format!("{}/*", bucket_arn(bucket))),
    ));

    PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement,
    }
}

/// Identity policy put on the user itself: `s3:*` on the bucket and its objects.
pub fn build_owner_inline_policy(bucket: &Bucket) -> PolicyDocument {
    let arn = bucket_arn(bucket);
    PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![Statement {
            sid: FULL_BUCKET_ACCESS_SID.to_string(),
            effect: "Allow".to_string(),
            principal: None,
            action: ActionType::Multiple(vec!["s3:*".to_string()]),
            resource: ResourceType::Multiple(vec![arn.clone(), format!("{arn}/*")]),
        }],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicAccessBlock {
    pub block_public_acls: bool,
    pub ignore_public_acls: bool,
    pub block_public_policy: bool,
    pub restrict_public_buckets: bool,
}

/// ACL flags follow `allow_public_acls`; policy flags stay on unless public paths were granted.
pub fn public_access_block(allow_public_acls: bool, has_public_paths: bool) -> PublicAccessBlock {
    PublicAccessBlock {
        block_public_acls: !allow_public_acls,
        ignore_public_acls: !allow_public_acls,
        block_public_policy: !has_public_paths,
        restrict_public_buckets: !has_public_paths,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsRule {
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub max_age_seconds: i32,
}

/// Single GET rule for the given origins, kept verbatim and in order.
pub fn build_cors_rule(origins: &[String]) -> ProvisionResult<CorsRule> {
    if origins.is_empty() {
        return Err(ProvisionError::InvalidArgument(
            "'origins' cannot be empty".to_string(),
        ));
    }
    Ok(CorsRule {
        allowed_methods: vec!["GET".to_string()],
        allowed_headers: vec!["Authorization".to_string()],
        allowed_origins: origins.to_vec(),
        max_age_seconds: CORS_MAX_AGE_SECONDS,
    })
}
