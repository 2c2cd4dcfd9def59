//! Account introspection used for context before provisioning

use crate::aws::CloudApi;
use crate::error::{ProvisionError, ProvisionResult};
use crate::types::CallerIdentity;
use log::debug;

impl<C: CloudApi> super::service::BucketProvisioner<C> {
    /// Resolve credentials through the provider chain. Nothing else can work without them.
    pub async fn check_credentials(&self) -> ProvisionResult<()> {
        self.client
            .check_credentials()
            .await
            .map_err(|e| ProvisionError::CredentialsMissing(e.to_string()))
    }

    /// Best-effort: `None` when the identity cannot be read.
    pub async fn get_current_identity(&self) -> Option<CallerIdentity> {
        match self.client.caller_identity().await {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!("Could not read caller identity: {e}");
                None
            }
        }
    }

    /// Best-effort: `None` when there is no alias or it cannot be listed.
    pub async fn get_account_alias(&self) -> Option<String> {
        match self.client.account_aliases().await {
            Ok(aliases) => aliases.into_iter().next(),
            Err(e) => {
                debug!("Could not list account aliases: {e}");
                None
            }
        }
    }
}
