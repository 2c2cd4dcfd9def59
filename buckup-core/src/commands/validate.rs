//! Name availability checks against S3 and IAM

use crate::aws::naming::{check_bucket_name, check_user_name};
use crate::aws::CloudApi;
use crate::error::{NameKind, ProvisionError, ProvisionResult};
use log::debug;

impl<C: CloudApi> super::service::BucketProvisioner<C> {
    /// Check that `name` is a well-formed bucket name nobody owns yet.
    ///
    /// HeadBucket answers 404 for a free name and 403 for a bucket owned by another
    /// account. A 2xx means the caller already owns it, which is just as unusable.
    pub async fn validate_bucket_name(&self, name: &str) -> ProvisionResult<()> {
        check_bucket_name(name)?;

        match self.client.head_bucket(name).await {
            Ok(()) => Err(ProvisionError::name_taken(NameKind::Bucket, name)),
            Err(e) if e.is_not_found() => {
                debug!("Bucket name \"{name}\" is available");
                Ok(())
            }
            Err(e) if e.is_forbidden() || e.is_redirect() => {
                Err(ProvisionError::name_taken(NameKind::Bucket, name))
            }
            Err(e) if e.is_invalid_input() => Err(ProvisionError::invalid_name(
                NameKind::Bucket,
                name,
                e.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Check that `name` is a well-formed IAM user name not used in this account.
    pub async fn validate_user_name(&self, name: &str) -> ProvisionResult<()> {
        check_user_name(name)?;

        match self.client.get_user(name).await {
            Ok(_) => Err(ProvisionError::name_taken(NameKind::User, name)),
            Err(e) if e.is_not_found() => {
                debug!("User name \"{name}\" is available");
                Ok(())
            }
            Err(e) if e.is_invalid_input() => Err(ProvisionError::invalid_name(
                NameKind::User,
                name,
                e.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
