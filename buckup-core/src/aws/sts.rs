//! STS helpers for caller identity

use crate::aws::{from_sdk, AwsError, AwsResult};
use crate::types::CallerIdentity;
use aws_sdk_sts::Client as StsClient;

/// Return who the configured credentials belong to, via STS GetCallerIdentity.
pub(crate) async fn caller_identity(client: &StsClient) -> AwsResult<CallerIdentity> {
    let out = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| from_sdk("GetCallerIdentity", e))?;
    let missing = |field: &str| AwsError::UnexpectedResponse {
        operation: "GetCallerIdentity",
        message: format!("response is missing {field}"),
    };
    Ok(CallerIdentity {
        arn: out.arn().ok_or_else(|| missing("Arn"))?.to_string(),
        account: out.account().ok_or_else(|| missing("Account"))?.to_string(),
    })
}
