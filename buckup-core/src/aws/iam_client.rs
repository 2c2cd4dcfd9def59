//! IAM user, access key and inline policy operations

use crate::aws::{from_sdk, AwsError, AwsResult};
use crate::types::{Keypair, User};
use aws_sdk_iam::client::Waiters;
use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::Client as IamClient;
use std::time::Duration;

fn to_user(user: &aws_sdk_iam::types::User) -> User {
    User {
        name: user.user_name().to_string(),
        arn: user.arn().to_string(),
        user_id: user.user_id().to_string(),
    }
}

pub(crate) async fn get_user(client: &IamClient, user_name: &str) -> AwsResult<User> {
    let response = client
        .get_user()
        .user_name(user_name)
        .send()
        .await
        .map_err(|e| from_sdk("GetUser", e))?;
    response
        .user()
        .map(to_user)
        .ok_or_else(|| AwsError::UnexpectedResponse {
            operation: "GetUser",
            message: format!("no user returned for '{user_name}'"),
        })
}

pub(crate) async fn create_user(client: &IamClient, user_name: &str) -> AwsResult<User> {
    let response = client
        .create_user()
        .user_name(user_name)
        .send()
        .await
        .map_err(|e| from_sdk("CreateUser", e))?;
    response
        .user()
        .map(to_user)
        .ok_or_else(|| AwsError::UnexpectedResponse {
            operation: "CreateUser",
            message: format!("no user returned for '{user_name}'"),
        })
}

pub(crate) async fn wait_until_user_exists(
    client: &IamClient,
    user_name: &str,
    timeout: Duration,
) -> AwsResult<()> {
    client
        .wait_until_user_exists()
        .user_name(user_name)
        .wait(timeout)
        .await
        .map_err(|e| AwsError::Waiter {
            operation: "UserExists",
            message: DisplayErrorContext(&e).to_string(),
        })?;
    Ok(())
}

pub(crate) async fn create_access_key(client: &IamClient, user_name: &str) -> AwsResult<Keypair> {
    let response = client
        .create_access_key()
        .user_name(user_name)
        .send()
        .await
        .map_err(|e| from_sdk("CreateAccessKey", e))?;
    let access_key = response
        .access_key()
        .ok_or_else(|| AwsError::UnexpectedResponse {
            operation: "CreateAccessKey",
            message: "no access key in response".to_string(),
        })?;
    Ok(Keypair::new(
        access_key.access_key_id(),
        access_key.secret_access_key(),
    ))
}

pub(crate) async fn put_user_policy(
    client: &IamClient,
    user_name: &str,
    policy_name: &str,
    policy: &str,
) -> AwsResult<()> {
    client
        .put_user_policy()
        .user_name(user_name)
        .policy_name(policy_name)
        .policy_document(policy)
        .send()
        .await
        .map_err(|e| from_sdk("PutUserPolicy", e))?;
    Ok(())
}

pub(crate) async fn list_account_aliases(client: &IamClient) -> AwsResult<Vec<String>> {
    let response = client
        .list_account_aliases()
        .send()
        .await
        .map_err(|e| from_sdk("ListAccountAliases", e))?;
    Ok(response.account_aliases().to_vec())
}
