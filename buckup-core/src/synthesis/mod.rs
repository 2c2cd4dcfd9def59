//! Policy and bucket configuration synthesis (deterministic, no I/O)

pub mod policy_builder;

pub use policy_builder::{
    build_bucket_policy, build_cors_rule, build_owner_inline_policy, bucket_arn,
    object_resource_arn, public_access_block, CorsRule, PublicAccessBlock,
};
