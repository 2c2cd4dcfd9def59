//! Commands module - service layer for bucket provisioning

mod account;
mod provision;
pub(crate) mod service;
mod validate;

pub use service::BucketProvisioner;
