//! Request, result and policy document types

use crate::aws::naming::{check_bucket_name, check_policy_name, check_user_name, default_user_name};
use crate::error::{ProvisionError, ProvisionResult};
use crate::synthesis::{CorsRule, PublicAccessBlock};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The region S3 treats as "no location constraint".
pub const DEFAULT_REGION: &str = "us-east-1";

/// Path meaning "every object in the bucket".
pub const WILDCARD_PATH: &str = "*";

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_REGION
    }

    /// `us-east-1` rejects an explicit location constraint, every other region requires one.
    pub fn location_constraint(&self) -> Option<&str> {
        if self.is_default() {
            None
        } else {
            Some(&self.0)
        }
    }

    pub fn partition(&self) -> &'static str {
        if self.0.starts_with("cn-") {
            "aws-cn"
        } else if self.0.starts_with("us-gov-") {
            "aws-us-gov"
        } else {
            "aws"
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canned ACL applied when the bucket is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
}

impl BucketAcl {
    pub const ALL: [Self; 4] = [
        Self::Private,
        Self::PublicRead,
        Self::PublicReadWrite,
        Self::AuthenticatedRead,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
        }
    }
}

impl FromStr for BucketAcl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|acl| acl.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|acl| acl.as_str()).collect();
                format!("unknown bucket ACL '{s}', expected one of: {}", names.join(", "))
            })
    }
}

impl fmt::Display for BucketAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to provision one bucket and its owner user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub bucket_name: String,
    pub region: Region,
    pub user_name: String,
    pub enable_versioning: bool,
    pub public_get_object_paths: Vec<String>,
    pub allow_public_acls: bool,
    pub cors_origins: Vec<String>,
    pub bucket_acl: Option<BucketAcl>,
    /// Inline `s3:*` policy put on the user in addition to the bucket policy.
    pub inline_policy_name: Option<String>,
}

impl ProvisionRequest {
    /// A private, unversioned bucket owned by `<bucket_name>-s3-owner`.
    pub fn new(bucket_name: impl Into<String>, region: Region) -> Self {
        let bucket_name = bucket_name.into();
        Self {
            user_name: default_user_name(&bucket_name),
            bucket_name,
            region,
            enable_versioning: false,
            public_get_object_paths: Vec::new(),
            allow_public_acls: false,
            cors_origins: Vec::new(),
            bucket_acl: None,
            inline_policy_name: None,
        }
    }

    /// Trims the given paths, drops blanks and duplicates, and keeps the first-seen order.
    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.public_get_object_paths = normalize_paths(paths);
        self
    }

    pub fn has_public_paths(&self) -> bool {
        !self.public_get_object_paths.is_empty()
    }

    /// Check every field locally. Runs once, before any AWS call.
    pub fn validate(&self) -> ProvisionResult<()> {
        check_bucket_name(&self.bucket_name)?;
        check_user_name(&self.user_name)?;
        if let Some(policy_name) = &self.inline_policy_name {
            check_policy_name(policy_name)?;
        }
        check_public_paths(&self.public_get_object_paths)?;
        if self.cors_origins.iter().any(|origin| origin.trim().is_empty()) {
            return Err(ProvisionError::invalid_request(
                "CORS origins must not be empty strings",
            ));
        }
        if self.region.as_str().is_empty() {
            return Err(ProvisionError::invalid_request("region must not be empty"));
        }
        Ok(())
    }
}

/// Deduplicate while keeping first-seen order.
pub fn normalize_paths<I, S>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for path in paths {
        let trimmed = path.as_ref().trim();
        if !trimmed.is_empty() && seen.insert(trimmed.to_string()) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}

/// The whole-bucket wildcard cannot be combined with other paths, and no path may
/// appear twice.
pub fn check_public_paths(paths: &[String]) -> ProvisionResult<()> {
    if paths.len() > 1 && paths.iter().any(|path| path == WILDCARD_PATH) {
        return Err(ProvisionError::invalid_request(
            "If you specify a wildcard, you should not specify other paths",
        ));
    }
    if paths.iter().any(|path| path.trim().is_empty()) {
        return Err(ProvisionError::invalid_request(
            "public paths must not be empty strings",
        ));
    }
    let mut seen = HashSet::new();
    if let Some(duplicate) = paths.iter().find(|path| !seen.insert(path.as_str())) {
        return Err(ProvisionError::invalid_request(format!(
            "public path \"{duplicate}\" is listed more than once"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub region: Region,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub arn: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub arn: String,
    pub account: String,
}

/// Access key pair of the owner user. Only ever returned once.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    pub access_key_id: String,
    secret_access_key: String,
}

impl Keypair {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub sid: String,
    pub effect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    pub action: ActionType,
    pub resource: ResourceType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ActionType {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResourceType {
    Single(String),
    Multiple(Vec<String>),
}

impl ResourceType {
    pub fn as_vec(&self) -> Vec<&str> {
        match self {
            Self::Single(resource) => vec![resource.as_str()],
            Self::Multiple(resources) => resources.iter().map(String::as_str).collect(),
        }
    }
}

/// `"*"` for everyone, or `{"AWS": "<arn>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Principal {
    Everyone(String),
    Aws {
        #[serde(rename = "AWS")]
        aws: String,
    },
}

impl Principal {
    pub fn everyone() -> Self {
        Self::Everyone(WILDCARD_PATH.to_string())
    }

    pub fn aws(arn: impl Into<String>) -> Self {
        Self::Aws { aws: arn.into() }
    }
}

/// Retry policy for attaching a bucket policy whose principal IAM has not propagated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRetry {
    pub interval: Duration,
    /// `None` retries until the principal resolves.
    pub max_attempts: Option<u32>,
}

impl Default for PolicyRetry {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: Some(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    pub bucket_wait_timeout: Duration,
    pub user_wait_timeout: Duration,
    pub policy_retry: PolicyRetry,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            bucket_wait_timeout: Duration::from_secs(60),
            user_wait_timeout: Duration::from_secs(60),
            policy_retry: PolicyRetry::default(),
        }
    }
}

/// What a successful run created. The key pair is not stored anywhere else.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub bucket: Bucket,
    pub user: User,
    pub access_key: Keypair,
    pub bucket_policy: PolicyDocument,
    pub public_access_block: PublicAccessBlock,
    pub inline_policy_name: Option<String>,
    pub cors: Option<CorsRule>,
    pub versioning_enabled: bool,
}

/// Resources created so far; reported when a run stops part-way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedResources {
    pub bucket: Option<String>,
    pub user: Option<String>,
}

impl CreatedResources {
    pub fn is_empty(&self) -> bool {
        self.bucket.is_none() && self.user.is_none()
    }
}

impl fmt::Display for CreatedResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(bucket) = &self.bucket {
            parts.push(format!("bucket \"{bucket}\""));
        }
        if let Some(user) = &self.user {
            parts.push(format!("IAM user \"{user}\""));
        }
        f.write_str(&parts.join(", "))
    }
}
