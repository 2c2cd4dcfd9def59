//! Error taxonomy for bucket provisioning

use crate::aws::AwsError;
use std::fmt;
use thiserror::Error;

/// Which kind of name a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Bucket,
    User,
    Policy,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket => f.write_str("bucket"),
            Self::User => f.write_str("user"),
            Self::Policy => f.write_str("policy"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("The {kind} name \"{name}\" is already in use")]
    NameTaken { kind: NameKind, name: String },

    #[error("Invalid {kind} name \"{name}\": {reason}")]
    InvalidName {
        kind: NameKind,
        name: String,
        reason: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("AWS credentials not found: {0}")]
    CredentialsMissing(String),

    #[error("IAM user was still not visible to S3 after {attempts} bucket policy attempts")]
    PrincipalNotReady { attempts: u32 },

    #[error("Provisioning cancelled")]
    Cancelled,

    #[error("Failed to serialize policy document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Aws(#[from] AwsError),
}

impl ProvisionError {
    pub fn name_taken(kind: NameKind, name: impl Into<String>) -> Self {
        Self::NameTaken {
            kind,
            name: name.into(),
        }
    }

    pub fn invalid_name(kind: NameKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// True for failures an interactive caller can fix by choosing another name.
    pub fn is_name_rejection(&self) -> bool {
        matches!(self, Self::NameTaken { .. } | Self::InvalidName { .. })
    }
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
