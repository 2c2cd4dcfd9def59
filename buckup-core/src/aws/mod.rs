//! AWS SDK integration: the `CloudApi` seam, SDK-backed clients, error lowering.

pub(crate) mod client;
#[cfg(test)]
pub(crate) mod fake;
pub(crate) mod iam_client;
pub mod naming;
pub(crate) mod s3_client;
pub(crate) mod sts;

use crate::synthesis::{CorsRule, PublicAccessBlock};
use crate::types::{BucketAcl, CallerIdentity, Keypair, User};
use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AwsError {
    #[error("Unable to load AWS credentials: {0}")]
    Credentials(String),

    #[error("{operation} failed ({code}): {message}")]
    Service {
        operation: &'static str,
        code: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{operation} request was rejected before sending: {message}")]
    Construction {
        operation: &'static str,
        message: String,
    },

    #[error("Timed out waiting for {operation}: {message}")]
    Waiter {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} returned an unexpected response: {message}")]
    UnexpectedResponse {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} failed: {message}")]
    SdkError {
        operation: &'static str,
        message: String,
    },
}

pub type AwsResult<T> = Result<T, AwsError>;

impl AwsError {
    pub fn service(
        operation: &'static str,
        code: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Service {
            operation,
            code: code.into(),
            status,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => *status,
            _ => None,
        }
    }

    /// HeadBucket answers 404 without a body; GetUser answers `NoSuchEntity`.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
            || matches!(self.code(), Some("NotFound" | "NoSuchBucket" | "NoSuchEntity"))
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403) || matches!(self.code(), Some("Forbidden" | "AccessDenied"))
    }

    /// The bucket exists in a region other than the one the client talks to.
    pub fn is_redirect(&self) -> bool {
        self.status() == Some(301) || self.code() == Some("PermanentRedirect")
    }

    /// The provider (or the SDK, before sending) refused the name itself.
    ///
    /// HeadBucket responses carry no body, so a bare 400 from it stands in for
    /// `InvalidBucketName`.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::Construction { .. } => true,
            Self::Service {
                operation: "HeadBucket",
                status: Some(400),
                ..
            } => true,
            _ => matches!(self.code(), Some("InvalidBucketName" | "ValidationError")),
        }
    }

    /// S3 rejects a bucket policy whose principal IAM has not propagated yet with
    /// `MalformedPolicy: Invalid principal in policy`. This is the only error the
    /// policy attach step retries on.
    pub fn is_principal_not_ready(&self) -> bool {
        match self {
            Self::Service { code, message, .. } => {
                code == "MalformedPolicy"
                    && message.to_ascii_lowercase().contains("invalid principal")
            }
            _ => false,
        }
    }
}

/// Lower an SDK error to an [`AwsError`], keeping the error code, HTTP status and message.
pub(crate) fn from_sdk<E>(operation: &'static str, err: SdkError<E, HttpResponse>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            AwsError::Service {
                operation,
                code: service_error.code().unwrap_or("Unknown").to_string(),
                status: Some(context.raw().status().as_u16()),
                message: service_error.message().unwrap_or_default().to_string(),
            }
        }
        SdkError::ConstructionFailure(_) => AwsError::Construction {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        },
        _ => AwsError::SdkError {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

/// The storage and identity operations the provisioner consumes.
///
/// [`client::AwsCloudClient`] talks to AWS; tests use an in-memory fake.
#[async_trait]
pub trait CloudApi: Send + Sync {
    async fn check_credentials(&self) -> AwsResult<()>;

    async fn caller_identity(&self) -> AwsResult<CallerIdentity>;

    async fn account_aliases(&self) -> AwsResult<Vec<String>>;

    async fn head_bucket(&self, bucket: &str) -> AwsResult<()>;

    /// Returns the location reported by S3, if any.
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
        acl: Option<BucketAcl>,
    ) -> AwsResult<Option<String>>;

    async fn wait_until_bucket_exists(&self, bucket: &str, timeout: Duration) -> AwsResult<()>;

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> AwsResult<()>;

    async fn put_public_access_block(
        &self,
        bucket: &str,
        block: &PublicAccessBlock,
    ) -> AwsResult<()>;

    async fn put_bucket_cors(&self, bucket: &str, rule: &CorsRule) -> AwsResult<()>;

    async fn enable_versioning(&self, bucket: &str) -> AwsResult<()>;

    async fn get_user(&self, user_name: &str) -> AwsResult<User>;

    async fn create_user(&self, user_name: &str) -> AwsResult<User>;

    async fn wait_until_user_exists(&self, user_name: &str, timeout: Duration) -> AwsResult<()>;

    async fn create_access_key(&self, user_name: &str) -> AwsResult<Keypair>;

    async fn put_user_policy(
        &self,
        user_name: &str,
        policy_name: &str,
        policy: &str,
    ) -> AwsResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_not_ready_matches_only_malformed_principal() {
        let err = AwsError::service(
            "PutBucketPolicy",
            "MalformedPolicy",
            Some(400),
            "Invalid principal in policy",
        );
        assert!(err.is_principal_not_ready());

        let other_malformed = AwsError::service(
            "PutBucketPolicy",
            "MalformedPolicy",
            Some(400),
            "Policy has invalid resource",
        );
        assert!(!other_malformed.is_principal_not_ready());

        let denied = AwsError::service("PutBucketPolicy", "AccessDenied", Some(403), "");
        assert!(!denied.is_principal_not_ready());

        let transport = AwsError::SdkError {
            operation: "PutBucketPolicy",
            message: "Invalid principal".into(),
        };
        assert!(!transport.is_principal_not_ready());
    }

    #[test]
    fn test_head_bucket_status_classification() {
        let missing = AwsError::service("HeadBucket", "Unknown", Some(404), "");
        assert!(missing.is_not_found());
        assert!(!missing.is_forbidden());

        let forbidden = AwsError::service("HeadBucket", "Unknown", Some(403), "");
        assert!(forbidden.is_forbidden());
        assert!(!forbidden.is_not_found());

        let moved = AwsError::service("HeadBucket", "Unknown", Some(301), "");
        assert!(moved.is_redirect());
    }

    #[test]
    fn test_invalid_input_classification() {
        let construction = AwsError::Construction {
            operation: "HeadBucket",
            message: "invalid bucket name".into(),
        };
        assert!(construction.is_invalid_input());

        let validation = AwsError::service("GetUser", "ValidationError", Some(400), "bad");
        assert!(validation.is_invalid_input());

        let head_bad_request = AwsError::service("HeadBucket", "Unknown", Some(400), "");
        assert!(head_bad_request.is_invalid_input());
        let head_server_error = AwsError::service("HeadBucket", "Unknown", Some(500), "");
        assert!(!head_server_error.is_invalid_input());

        let throttled = AwsError::service("GetUser", "Throttling", Some(400), "slow down");
        assert!(!throttled.is_invalid_input());
        assert_eq!(throttled.code(), Some("Throttling"));
    }
}
