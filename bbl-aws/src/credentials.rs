//! Fail-fast credential presence check

use bbl_core::CoreError;
use bbl_core::managers::CredentialValidator;
use bbl_state::Aws;

pub struct AwsCredentialValidator {
    access_key_id: String,
    secret_access_key: String,
    region: String,
}

impl AwsCredentialValidator {
    pub fn new(aws: &Aws) -> Self {
        Self {
            access_key_id: aws.access_key_id.clone(),
            secret_access_key: aws.secret_access_key.clone(),
            region: aws.region.clone(),
        }
    }
}

impl CredentialValidator for AwsCredentialValidator {
    fn validate(&self) -> Result<(), CoreError> {
        if self.access_key_id.is_empty() {
            return Err(CoreError::Credentials(
                "aws access key id must be provided".to_string(),
            ));
        }
        if self.secret_access_key.is_empty() {
            return Err(CoreError::Credentials(
                "aws secret access key must be provided".to_string(),
            ));
        }
        if self.region.is_empty() {
            return Err(CoreError::Credentials(
                "aws region must be provided".to_string(),
            ));
        }
        Ok(())
    }
}
