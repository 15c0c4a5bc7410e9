//! SDK client construction from state credentials

use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::config::Credentials;

/// The SDK clients bbl's AWS collaborators share.
///
/// Credentials come from the reconciled state (or the command line), never
/// from the ambient environment, so every invocation is explicit about the
/// account it touches.
#[derive(Clone)]
pub struct AwsClients {
    pub cloudformation: aws_sdk_cloudformation::Client,
    pub ec2: aws_sdk_ec2::Client,
    pub iam: aws_sdk_iam::Client,
}

impl AwsClients {
    pub async fn new(access_key_id: &str, secret_access_key: &str, region: &str) -> Self {
        let credentials = Credentials::new(
            access_key_id.to_string(),
            secret_access_key.to_string(),
            None,
            None,
            "bbl",
        );
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .load()
            .await;

        Self {
            cloudformation: aws_sdk_cloudformation::Client::new(&config),
            ec2: aws_sdk_ec2::Client::new(&config),
            iam: aws_sdk_iam::Client::new(&config),
        }
    }
}
