//! The provisioning sequence: bucket, owner user, bucket policy, public access
//! block, optional CORS and versioning, then one access key.

use crate::aws::CloudApi;
use crate::error::{ProvisionError, ProvisionResult};
use crate::synthesis::{
    build_bucket_policy, build_cors_rule, build_owner_inline_policy, public_access_block, CorsRule,
    PublicAccessBlock,
};
use crate::types::{
    Bucket, BucketAcl, CreatedResources, Keypair, PolicyDocument, ProvisionOutcome,
    ProvisionRequest, Region, User,
};
use log::{info, warn};

impl<C: CloudApi> super::service::BucketProvisioner<C> {
    /// Run the whole sequence for a request.
    ///
    /// The request is validated before the first call. Nothing is rolled back: when a
    /// step fails or the run is cancelled, whatever was already created stays, and a
    /// warning names it for manual cleanup.
    pub async fn provision(&self, request: &ProvisionRequest) -> ProvisionResult<ProvisionOutcome> {
        request.validate()?;

        let mut created = CreatedResources::default();
        let result = self.run_sequence(request, &mut created).await;
        if let Err(e) = &result {
            if !created.is_empty() {
                warn!("Provisioning stopped ({e}). Manual cleanup required: {created}");
            }
        }
        result
    }

    async fn run_sequence(
        &self,
        request: &ProvisionRequest,
        created: &mut CreatedResources,
    ) -> ProvisionResult<ProvisionOutcome> {
        self.checkpoint()?;
        let bucket = self
            .create_bucket(&request.bucket_name, &request.region, request.bucket_acl)
            .await?;
        created.bucket = Some(bucket.name.clone());

        self.checkpoint()?;
        let user = self.create_user(&request.user_name).await?;
        created.user = Some(user.name.clone());

        self.checkpoint()?;
        let bucket_policy = build_bucket_policy(&bucket, &user, &request.public_get_object_paths);
        self.attach_bucket_policy(&bucket, &bucket_policy).await?;
        let public_access_block = self
            .apply_public_access_block(&bucket, request.allow_public_acls, request.has_public_paths())
            .await?;

        if let Some(policy_name) = &request.inline_policy_name {
            self.checkpoint()?;
            self.attach_owner_policy(&bucket, &user, policy_name).await?;
        }

        let cors = if request.cors_origins.is_empty() {
            None
        } else {
            self.checkpoint()?;
            Some(self.set_cors(&bucket, &request.cors_origins).await?)
        };

        if request.enable_versioning {
            self.checkpoint()?;
            self.enable_versioning(&bucket).await?;
        }

        self.checkpoint()?;
        let access_key = self.create_access_key(&user).await?;

        Ok(ProvisionOutcome {
            bucket,
            user,
            access_key,
            bucket_policy,
            public_access_block,
            inline_policy_name: request.inline_policy_name.clone(),
            cors,
            versioning_enabled: request.enable_versioning,
        })
    }

    /// Create the bucket and wait until S3 reports it.
    pub async fn create_bucket(
        &self,
        name: &str,
        region: &Region,
        acl: Option<BucketAcl>,
    ) -> ProvisionResult<Bucket> {
        let location = self
            .client
            .create_bucket(name, region.location_constraint(), acl)
            .await?;
        info!(
            "Created bucket \"{name}\" at \"{}\" in region \"{region}\"",
            location.as_deref().unwrap_or("-")
        );

        self.client
            .wait_until_bucket_exists(name, self.settings.bucket_wait_timeout)
            .await?;

        Ok(Bucket {
            name: name.to_string(),
            region: region.clone(),
            location,
        })
    }

    /// Create the user and wait until IAM reports it.
    pub async fn create_user(&self, user_name: &str) -> ProvisionResult<User> {
        let user = self.client.create_user(user_name).await?;
        info!("Created IAM user \"{}\" ({})", user.name, user.arn);

        self.client
            .wait_until_user_exists(user_name, self.settings.user_wait_timeout)
            .await?;
        Ok(user)
    }

    pub async fn create_access_key(&self, user: &User) -> ProvisionResult<Keypair> {
        let keypair = self.client.create_access_key(&user.name).await?;
        info!("Created access key pair for user \"{}\"", user.name);
        Ok(keypair)
    }

    /// Put the bucket policy, retrying while S3 cannot resolve the new user yet.
    pub async fn attach_bucket_policy(
        &self,
        bucket: &Bucket,
        policy: &PolicyDocument,
    ) -> ProvisionResult<()> {
        let policy_json = serde_json::to_string(policy)?;
        let retry = &self.settings.policy_retry;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match self.client.put_bucket_policy(&bucket.name, &policy_json).await {
                Ok(()) => {
                    info!(
                        "Attached bucket policy with {} statements to \"{}\"",
                        policy.statement.len(),
                        bucket.name
                    );
                    return Ok(());
                }
                Err(e) if e.is_principal_not_ready() => {
                    if retry.max_attempts.is_some_and(|max| attempts >= max) {
                        return Err(ProvisionError::PrincipalNotReady { attempts });
                    }
                    info!(
                        "IAM user is not visible to S3 yet (attempt {attempts}), retrying in {:?}",
                        retry.interval
                    );
                    tokio::select! {
                        () = self.cancel.cancelled() => return Err(ProvisionError::Cancelled),
                        () = tokio::time::sleep(retry.interval) => {}
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn apply_public_access_block(
        &self,
        bucket: &Bucket,
        allow_public_acls: bool,
        has_public_paths: bool,
    ) -> ProvisionResult<PublicAccessBlock> {
        let block = public_access_block(allow_public_acls, has_public_paths);
        self.client
            .put_public_access_block(&bucket.name, &block)
            .await?;
        info!("Set public access block on \"{}\": {block:?}", bucket.name);
        Ok(block)
    }

    /// Put an inline `s3:*` policy for the bucket directly on the user.
    pub async fn attach_owner_policy(
        &self,
        bucket: &Bucket,
        user: &User,
        policy_name: &str,
    ) -> ProvisionResult<()> {
        let policy_json = serde_json::to_string(&build_owner_inline_policy(bucket))?;
        self.client
            .put_user_policy(&user.name, policy_name, &policy_json)
            .await?;
        info!(
            "Attached policy \"{policy_name}\" to user \"{}\"",
            user.name
        );
        Ok(())
    }

    /// Allow GET from `origins`. An empty list is a caller error and sends nothing.
    pub async fn set_cors(&self, bucket: &Bucket, origins: &[String]) -> ProvisionResult<CorsRule> {
        let rule = build_cors_rule(origins)?;
        self.client.put_bucket_cors(&bucket.name, &rule).await?;
        info!(
            "Set CORS for domains {} on bucket \"{}\"",
            origins.join(", "),
            bucket.name
        );
        Ok(rule)
    }

    /// Turn versioning on. Never turns it off.
    pub async fn enable_versioning(&self, bucket: &Bucket) -> ProvisionResult<()> {
        self.client.enable_versioning(&bucket.name).await?;
        info!("Enabled versioning for \"{}\"", bucket.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::aws::fake::{user_arn, Call, FakeCloud};
    use crate::commands::BucketProvisioner;
    use crate::error::ProvisionError;
    use crate::synthesis::{public_access_block, CorsRule};
    use crate::types::{
        Bucket, BucketAcl, PolicyDocument, PolicyRetry, ProvisionRequest, ProvisionSettings,
        Region,
    };
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn fast_settings(max_attempts: Option<u32>) -> ProvisionSettings {
        ProvisionSettings {
            policy_retry: PolicyRetry {
                interval: Duration::from_millis(1),
                max_attempts,
            },
            ..ProvisionSettings::default()
        }
    }

    fn provisioner(fake: FakeCloud) -> BucketProvisioner<FakeCloud> {
        BucketProvisioner::new(fake).with_settings(fast_settings(Some(10)))
    }

    fn acme_request() -> ProvisionRequest {
        let mut request = ProvisionRequest::new("acme-assets", Region::new("us-east-1"))
            .with_public_paths(["images/*"]);
        request.allow_public_acls = false;
        request.cors_origins = vec!["https://acme.com".to_string()];
        request.enable_versioning = true;
        request
    }

    fn bucket() -> Bucket {
        Bucket {
            name: "acme-assets".into(),
            region: Region::new("us-east-1"),
            location: None,
        }
    }

    fn policy_calls(calls: &[Call]) -> Vec<PolicyDocument> {
        calls
            .iter()
            .filter_map(|call| match call {
                Call::PutBucketPolicy { policy, .. } => {
                    Some(serde_json::from_str(policy).expect("policy json"))
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_acme_assets() {
        let provisioner = provisioner(FakeCloud::default());
        let request = acme_request();
        assert_eq!(request.user_name, "acme-assets-s3-owner");

        let outcome = provisioner.provision(&request).await.expect("provision");
        let calls = provisioner.client.calls();

        let policies = policy_calls(&calls);
        assert_eq!(policies.len(), 1);
        let sids: Vec<&str> = policies[0]
            .statement
            .iter()
            .map(|s| s.sid.as_str())
            .collect();
        assert_eq!(
            sids,
            vec![
                "PublicGetObject",
                "AllowUserManageBucket",
                "AllowUserManageBucketObjects"
            ]
        );
        assert_eq!(
            policies[0].statement[0].resource.as_vec(),
            vec!["arn:aws:s3:::acme-assets/images/*"]
        );

        let expected_rule = CorsRule {
            allowed_methods: vec!["GET".into()],
            allowed_headers: vec!["Authorization".into()],
            allowed_origins: vec!["https://acme.com".into()],
            max_age_seconds: 3000,
        };
        let policy_json = match &calls[4] {
            Call::PutBucketPolicy { policy, .. } => policy.clone(),
            other => panic!("expected PutBucketPolicy, got {other:?}"),
        };

        assert_eq!(
            calls,
            vec![
                Call::CreateBucket {
                    bucket: "acme-assets".into(),
                    location_constraint: None,
                    acl: None,
                },
                Call::WaitBucket("acme-assets".into()),
                Call::CreateUser("acme-assets-s3-owner".into()),
                Call::WaitUser("acme-assets-s3-owner".into()),
                Call::PutBucketPolicy {
                    bucket: "acme-assets".into(),
                    policy: policy_json,
                },
                Call::PutPublicAccessBlock {
                    bucket: "acme-assets".into(),
                    block: public_access_block(false, true),
                },
                Call::PutBucketCors {
                    bucket: "acme-assets".into(),
                    rule: expected_rule.clone(),
                },
                Call::EnableVersioning("acme-assets".into()),
                Call::CreateAccessKey("acme-assets-s3-owner".into()),
            ]
        );

        assert!(outcome.public_access_block.block_public_acls);
        assert!(outcome.public_access_block.ignore_public_acls);
        assert!(!outcome.public_access_block.block_public_policy);
        assert!(!outcome.public_access_block.restrict_public_buckets);
        assert_eq!(outcome.cors, Some(expected_rule));
        assert!(outcome.versioning_enabled);
        assert_eq!(outcome.user.arn, user_arn("acme-assets-s3-owner"));
        assert_eq!(outcome.access_key.access_key_id, "AKIAFAKEACCESSKEY");
        assert_eq!(outcome.bucket.location.as_deref(), Some("/acme-assets"));
    }

    #[tokio::test]
    async fn test_other_regions_send_location_constraint_and_acl() {
        let provisioner = provisioner(FakeCloud::default());
        let mut request = ProvisionRequest::new("acme-assets", Region::new("eu-west-2"));
        request.bucket_acl = Some(BucketAcl::Private);

        provisioner.provision(&request).await.expect("provision");
        assert_eq!(
            provisioner.client.calls()[0],
            Call::CreateBucket {
                bucket: "acme-assets".into(),
                location_constraint: Some("eu-west-2".into()),
                acl: Some(BucketAcl::Private),
            }
        );
    }

    #[tokio::test]
    async fn test_private_bucket_skips_optional_steps() {
        let provisioner = provisioner(FakeCloud::default());
        let request = ProvisionRequest::new("acme-assets", Region::new("us-east-1"));

        let outcome = provisioner.provision(&request).await.expect("provision");
        let calls = provisioner.client.calls();

        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::PutBucketCors { .. } | Call::EnableVersioning(_))));
        assert_eq!(outcome.bucket_policy.statement.len(), 2);
        assert_eq!(outcome.public_access_block, public_access_block(false, false));
        assert!(outcome.cors.is_none());
        assert!(matches!(calls.last(), Some(Call::CreateAccessKey(_))));
    }

    #[tokio::test]
    async fn test_inline_owner_policy_is_put_on_user() {
        let provisioner = provisioner(FakeCloud::default());
        let mut request = ProvisionRequest::new("acme-assets", Region::new("us-east-1"));
        request.inline_policy_name = Some("acme-assets-s3-owner-policy".into());

        provisioner.provision(&request).await.expect("provision");
        let put = provisioner
            .client
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::PutUserPolicy {
                    user,
                    policy_name,
                    policy,
                } => Some((user, policy_name, policy)),
                _ => None,
            })
            .expect("PutUserPolicy call");
        assert_eq!(put.0, "acme-assets-s3-owner");
        assert_eq!(put.1, "acme-assets-s3-owner-policy");
        assert!(put.2.contains("AllowFullBucketAccess"));
    }

    #[tokio::test]
    async fn test_principal_not_ready_is_retried_until_visible() {
        let provisioner = provisioner(FakeCloud {
            principal_not_ready_failures: AtomicU32::new(3),
            ..FakeCloud::default()
        });

        let outcome = provisioner
            .provision(&acme_request())
            .await
            .expect("retry should hide the transient error");
        let calls = provisioner.client.calls();
        assert_eq!(policy_calls(&calls).len(), 4);
        assert_eq!(outcome.bucket_policy.statement.len(), 3);
        assert!(calls
            .iter()
            .any(|c| matches!(c, Call::PutPublicAccessBlock { .. })));
    }

    #[tokio::test]
    async fn test_principal_retry_cap_is_reported() {
        let provisioner = BucketProvisioner::new(FakeCloud {
            principal_not_ready_failures: AtomicU32::new(100),
            ..FakeCloud::default()
        })
        .with_settings(fast_settings(Some(3)));

        match provisioner.provision(&acme_request()).await {
            Err(ProvisionError::PrincipalNotReady { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected PrincipalNotReady, got {other:?}"),
        }
        let calls = provisioner.client.calls();
        assert_eq!(policy_calls(&calls).len(), 3);
        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::PutPublicAccessBlock { .. })));
    }

    #[tokio::test]
    async fn test_unbounded_retry_keeps_going() {
        let provisioner = BucketProvisioner::new(FakeCloud {
            principal_not_ready_failures: AtomicU32::new(25),
            ..FakeCloud::default()
        })
        .with_settings(fast_settings(None));

        provisioner
            .provision(&acme_request())
            .await
            .expect("unbounded retry should succeed");
        assert_eq!(policy_calls(&provisioner.client.calls()).len(), 26);
    }

    #[tokio::test]
    async fn test_other_policy_errors_are_fatal() {
        let provisioner = provisioner(FakeCloud {
            fail_operation: Some("PutBucketPolicy"),
            ..FakeCloud::default()
        });
        assert!(matches!(
            provisioner.provision(&acme_request()).await,
            Err(ProvisionError::Aws(_))
        ));
        assert_eq!(policy_calls(&provisioner.client.calls()).len(), 1);
    }

    #[tokio::test]
    async fn test_set_cors_with_no_origins_sends_nothing() {
        let provisioner = provisioner(FakeCloud::default());
        match provisioner.set_cors(&bucket(), &[]).await {
            Err(ProvisionError::InvalidArgument(msg)) => assert!(msg.contains("origins")),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
        assert!(provisioner.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_calls() {
        let provisioner = provisioner(FakeCloud::default());
        let request = ProvisionRequest::new("acme-assets", Region::new("us-east-1"))
            .with_public_paths(["*", "images/*"]);
        assert!(matches!(
            provisioner.provision(&request).await,
            Err(ProvisionError::InvalidRequest(_))
        ));
        assert!(provisioner.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_after_bucket_creation_leaves_bucket() {
        let provisioner = provisioner(FakeCloud {
            fail_operation: Some("CreateUser"),
            ..FakeCloud::default()
        });
        assert!(provisioner.provision(&acme_request()).await.is_err());
        let calls = provisioner.client.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], Call::CreateBucket { .. }));
        assert_eq!(calls[2], Call::CreateUser("acme-assets-s3-owner".into()));
    }

    #[tokio::test]
    async fn test_user_waiter_failure_stops_before_bucket_policy() {
        let provisioner = provisioner(FakeCloud {
            fail_operation: Some("UserExists"),
            ..FakeCloud::default()
        });
        match provisioner.provision(&acme_request()).await {
            Err(ProvisionError::Aws(e)) => assert_eq!(
                e.to_string(),
                "UserExists failed (InternalError): simulated failure"
            ),
            other => panic!("expected Aws error, got {other:?}"),
        }
        assert_eq!(
            provisioner.client.calls(),
            vec![
                Call::CreateBucket {
                    bucket: "acme-assets".into(),
                    location_constraint: None,
                    acl: None,
                },
                Call::WaitBucket("acme-assets".into()),
                Call::CreateUser("acme-assets-s3-owner".into()),
                Call::WaitUser("acme-assets-s3-owner".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_bucket_waiter_failure_stops_before_user() {
        let provisioner = provisioner(FakeCloud {
            fail_operation: Some("BucketExists"),
            ..FakeCloud::default()
        });
        assert!(matches!(
            provisioner.provision(&acme_request()).await,
            Err(ProvisionError::Aws(_))
        ));
        let calls = provisioner.client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], Call::WaitBucket("acme-assets".into()));
        assert!(!calls.iter().any(|c| matches!(c, Call::CreateUser(_))));
    }

    #[tokio::test]
    async fn test_late_failure_returns_original_error() {
        let provisioner = provisioner(FakeCloud {
            fail_operation: Some("PutBucketCors"),
            ..FakeCloud::default()
        });
        match provisioner.provision(&acme_request()).await {
            Err(ProvisionError::Aws(e)) => {
                assert_eq!(e.code(), Some("InternalError"));
                assert!(e.to_string().starts_with("PutBucketCors failed"));
            }
            other => panic!("expected Aws error, got {other:?}"),
        }
        let calls = provisioner.client.calls();
        assert!(matches!(calls.last(), Some(Call::PutBucketCors { .. })));
        assert!(!calls.iter().any(|c| matches!(c, Call::CreateAccessKey(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_calls() {
        let provisioner = provisioner(FakeCloud::default());
        provisioner.cancellation_token().cancel();
        assert!(matches!(
            provisioner.provision(&acme_request()).await,
            Err(ProvisionError::Cancelled)
        ));
        assert!(provisioner.client.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_policy_retry_stops_before_next_call() {
        let provisioner = BucketProvisioner::new(FakeCloud {
            principal_not_ready_failures: AtomicU32::new(100),
            ..FakeCloud::default()
        })
        .with_settings(ProvisionSettings {
            policy_retry: PolicyRetry {
                interval: Duration::from_secs(5),
                max_attempts: None,
            },
            ..ProvisionSettings::default()
        });
        let token = provisioner.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            token.cancel();
        });

        assert!(matches!(
            provisioner.provision(&acme_request()).await,
            Err(ProvisionError::Cancelled)
        ));
        let calls = provisioner.client.calls();
        assert_eq!(policy_calls(&calls).len(), 3);
        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::PutPublicAccessBlock { .. })));
    }
}
