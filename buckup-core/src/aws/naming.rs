//! Local S3 and IAM naming rules.
//!
//! These checks run before any request is sent so a malformed name is reported as
//! `InvalidName` instead of surfacing as an opaque SDK construction failure.

use crate::error::{NameKind, ProvisionError, ProvisionResult};
use regex::Regex;
use std::sync::OnceLock;

pub const USER_NAME_SUFFIX: &str = "-s3-owner";

const RESERVED_BUCKET_PREFIXES: &[&str] = &["xn--", "sthree-", "amzn-s3-demo-"];
const RESERVED_BUCKET_SUFFIXES: &[&str] = &["-s3alias", "--ol-s3", ".mrap", "--x-s3"];

fn ipv4_like() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").expect("valid regex"))
}

fn iam_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w+=,.@-]+$").expect("valid regex"))
}

/// `<bucket>-s3-owner`
pub fn default_user_name(bucket_name: &str) -> String {
    format!("{bucket_name}{USER_NAME_SUFFIX}")
}

/// `<bucket>-s3-owner-policy`
pub fn default_policy_name(bucket_name: &str) -> String {
    format!("{}-policy", default_user_name(bucket_name))
}

pub fn check_bucket_name(name: &str) -> ProvisionResult<()> {
    let invalid = |reason: &str| Err(ProvisionError::invalid_name(NameKind::Bucket, name, reason));

    if !(3..=63).contains(&name.len()) {
        return invalid("bucket names must be between 3 and 63 characters long");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return invalid(
            "bucket names can only contain lowercase letters, numbers, dots (.) and hyphens (-)",
        );
    }
    let starts_ok = name.starts_with(|c: char| c.is_ascii_alphanumeric());
    let ends_ok = name.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok {
        return invalid("bucket names must begin and end with a letter or number");
    }
    if name.contains("..") {
        return invalid("bucket names must not contain two adjacent periods");
    }
    if ipv4_like().is_match(name) {
        return invalid("bucket names must not be formatted as an IP address");
    }
    if let Some(prefix) = RESERVED_BUCKET_PREFIXES.iter().find(|p| name.starts_with(*p)) {
        return invalid(&format!("bucket names must not start with \"{prefix}\""));
    }
    if let Some(suffix) = RESERVED_BUCKET_SUFFIXES.iter().find(|s| name.ends_with(*s)) {
        return invalid(&format!("bucket names must not end with \"{suffix}\""));
    }
    Ok(())
}

pub fn check_user_name(name: &str) -> ProvisionResult<()> {
    check_iam_name(NameKind::User, name, 64)
}

pub fn check_policy_name(name: &str) -> ProvisionResult<()> {
    check_iam_name(NameKind::Policy, name, 128)
}

fn check_iam_name(kind: NameKind, name: &str, max_len: usize) -> ProvisionResult<()> {
    if name.is_empty() || name.len() > max_len {
        return Err(ProvisionError::invalid_name(
            kind,
            name,
            format!("{kind} names must be between 1 and {max_len} characters long"),
        ));
    }
    if !iam_name().is_match(name) {
        return Err(ProvisionError::invalid_name(
            kind,
            name,
            format!("{kind} names can only contain alphanumeric characters and +=,.@_-"),
        ));
    }
    Ok(())
}
