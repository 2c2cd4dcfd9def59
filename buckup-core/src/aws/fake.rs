//! In-memory `CloudApi` that records every call, for provisioner tests.

use crate::aws::{AwsError, AwsResult, CloudApi};
use crate::synthesis::{CorsRule, PublicAccessBlock};
use crate::types::{BucketAcl, CallerIdentity, Keypair, User};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const ACCOUNT_ID: &str = "123456789012";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CheckCredentials,
    CallerIdentity,
    AccountAliases,
    HeadBucket(String),
    CreateBucket {
        bucket: String,
        location_constraint: Option<String>,
        acl: Option<BucketAcl>,
    },
    WaitBucket(String),
    PutBucketPolicy {
        bucket: String,
        policy: String,
    },
    PutPublicAccessBlock {
        bucket: String,
        block: PublicAccessBlock,
    },
    PutBucketCors {
        bucket: String,
        rule: CorsRule,
    },
    EnableVersioning(String),
    GetUser(String),
    CreateUser(String),
    WaitUser(String),
    CreateAccessKey(String),
    PutUserPolicy {
        user: String,
        policy_name: String,
        policy: String,
    },
}

pub(crate) fn user_arn(user_name: &str) -> String {
    format!("arn:aws:iam::{ACCOUNT_ID}:user/{user_name}")
}

pub(crate) fn fake_user(user_name: &str) -> User {
    User {
        name: user_name.to_string(),
        arn: user_arn(user_name),
        user_id: "AIDAFAKEUSERID".to_string(),
    }
}

pub(crate) fn principal_not_ready() -> AwsError {
    AwsError::service(
        "PutBucketPolicy",
        "MalformedPolicy",
        Some(400),
        "Invalid principal in policy",
    )
}

/// Defaults describe a fresh account: credentials resolve, the bucket and user
/// names are free, and every mutating call succeeds.
pub(crate) struct FakeCloud {
    pub(crate) calls: Mutex<Vec<Call>>,
    pub credentials: AwsResult<()>,
    pub identity: AwsResult<CallerIdentity>,
    pub aliases: AwsResult<Vec<String>>,
    pub head_bucket: AwsResult<()>,
    pub get_user: AwsResult<User>,
    /// Number of `PutBucketPolicy` calls that fail with an unresolvable principal.
    pub principal_not_ready_failures: AtomicU32,
    /// Operation name whose call fails with a generic service error.
    pub fail_operation: Option<&'static str>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            credentials: Ok(()),
            identity: Ok(CallerIdentity {
                arn: user_arn("admin"),
                account: ACCOUNT_ID.to_string(),
            }),
            aliases: Ok(vec!["acme".to_string()]),
            head_bucket: Err(AwsError::service("HeadBucket", "NotFound", Some(404), "")),
            get_user: Err(AwsError::service(
                "GetUser",
                "NoSuchEntity",
                Some(404),
                "The user cannot be found.",
            )),
            principal_not_ready_failures: AtomicU32::new(0),
            fail_operation: None,
        }
    }
}

impl FakeCloud {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check_failure(&self, operation: &'static str) -> AwsResult<()> {
        if self.fail_operation == Some(operation) {
            return Err(AwsError::service(
                operation,
                "InternalError",
                Some(500),
                "simulated failure",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CloudApi for FakeCloud {
    async fn check_credentials(&self) -> AwsResult<()> {
        self.record(Call::CheckCredentials);
        self.credentials.clone()
    }

    async fn caller_identity(&self) -> AwsResult<CallerIdentity> {
        self.record(Call::CallerIdentity);
        self.identity.clone()
    }

    async fn account_aliases(&self) -> AwsResult<Vec<String>> {
        self.record(Call::AccountAliases);
        self.aliases.clone()
    }

    async fn head_bucket(&self, bucket: &str) -> AwsResult<()> {
        self.record(Call::HeadBucket(bucket.to_string()));
        self.head_bucket.clone()
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
        acl: Option<BucketAcl>,
    ) -> AwsResult<Option<String>> {
        self.record(Call::CreateBucket {
            bucket: bucket.to_string(),
            location_constraint: location_constraint.map(ToString::to_string),
            acl,
        });
        self.check_failure("CreateBucket")?;
        Ok(Some(format!("/{bucket}")))
    }

    async fn wait_until_bucket_exists(&self, bucket: &str, _timeout: Duration) -> AwsResult<()> {
        self.record(Call::WaitBucket(bucket.to_string()));
        self.check_failure("BucketExists")
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> AwsResult<()> {
        self.record(Call::PutBucketPolicy {
            bucket: bucket.to_string(),
            policy: policy.to_string(),
        });
        self.check_failure("PutBucketPolicy")?;
        let remaining = self.principal_not_ready_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.principal_not_ready_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(principal_not_ready());
        }
        Ok(())
    }

    async fn put_public_access_block(
        &self,
        bucket: &str,
        block: &PublicAccessBlock,
    ) -> AwsResult<()> {
        self.record(Call::PutPublicAccessBlock {
            bucket: bucket.to_string(),
            block: *block,
        });
        self.check_failure("PutPublicAccessBlock")
    }

    async fn put_bucket_cors(&self, bucket: &str, rule: &CorsRule) -> AwsResult<()> {
        self.record(Call::PutBucketCors {
            bucket: bucket.to_string(),
            rule: rule.clone(),
        });
        self.check_failure("PutBucketCors")
    }

    async fn enable_versioning(&self, bucket: &str) -> AwsResult<()> {
        self.record(Call::EnableVersioning(bucket.to_string()));
        self.check_failure("PutBucketVersioning")
    }

    async fn get_user(&self, user_name: &str) -> AwsResult<User> {
        self.record(Call::GetUser(user_name.to_string()));
        self.get_user.clone()
    }

    async fn create_user(&self, user_name: &str) -> AwsResult<User> {
        self.record(Call::CreateUser(user_name.to_string()));
        self.check_failure("CreateUser")?;
        Ok(fake_user(user_name))
    }

    async fn wait_until_user_exists(&self, user_name: &str, _timeout: Duration) -> AwsResult<()> {
        self.record(Call::WaitUser(user_name.to_string()));
        self.check_failure("UserExists")
    }

    async fn create_access_key(&self, user_name: &str) -> AwsResult<Keypair> {
        self.record(Call::CreateAccessKey(user_name.to_string()));
        self.check_failure("CreateAccessKey")?;
        Ok(Keypair::new("AKIAFAKEACCESSKEY", "fake/secret/key"))
    }

    async fn put_user_policy(
        &self,
        user_name: &str,
        policy_name: &str,
        policy: &str,
    ) -> AwsResult<()> {
        self.record(Call::PutUserPolicy {
            user: user_name.to_string(),
            policy_name: policy_name.to_string(),
            policy: policy.to_string(),
        });
        self.check_failure("PutUserPolicy")
    }
}
