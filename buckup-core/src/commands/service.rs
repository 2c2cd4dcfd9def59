//! Bucket provisioning service layer
//!
//! This module provides the service interface that encapsulates the provisioning
//! sequence. The service holds a cloud client and settings and exposes high-level
//! operations (validate names, provision, account introspection) consumed by the
//! two CLI front-ends.

use crate::aws::client::AwsCloudClient;
use crate::aws::CloudApi;
use crate::error::{ProvisionError, ProvisionResult};
use crate::types::{ProvisionSettings, Region};
use tokio_util::sync::CancellationToken;

/// Main service struct that holds the cloud client and provisioning settings
pub struct BucketProvisioner<C = AwsCloudClient> {
    pub(crate) client: C,
    pub(crate) settings: ProvisionSettings,
    pub(crate) cancel: CancellationToken,
}

impl BucketProvisioner<AwsCloudClient> {
    /// Create a service backed by the AWS SDK
    ///
    /// Configuration is loaded using the default credential and region provider chain;
    /// `profile` and `region` override the chain when given. Loading never fails here;
    /// missing credentials surface from [`BucketProvisioner::check_credentials`].
    pub async fn from_environment(profile: Option<&str>, region: Option<&str>) -> Self {
        Self::new(AwsCloudClient::load(profile, region).await)
    }

    pub fn configured_region(&self) -> Option<Region> {
        self.client.region()
    }
}

impl<C: CloudApi> BucketProvisioner<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            settings: ProvisionSettings::default(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ProvisionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    /// Cancelling this token stops the sequence before its next API call.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(crate) fn checkpoint(&self) -> ProvisionResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ProvisionError::Cancelled);
        }
        Ok(())
    }
}
