//! SSH key pair synchronization over EC2

use async_trait::async_trait;
use bbl_core::CoreError;
use bbl_core::managers::{KeyPairDeleter, KeyPairSynchronizer};
use bbl_state::KeyPair;
use uuid::Uuid;

pub struct Ec2KeyPairSynchronizer {
    client: aws_sdk_ec2::Client,
}

impl Ec2KeyPairSynchronizer {
    pub fn new(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }

    async fn exists(&self, name: &str) -> Result<bool, CoreError> {
        let result = self
            .client
            .describe_key_pairs()
            .key_names(name)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                let err_str = format!("{:?}", e);
                if err_str.contains("InvalidKeyPair.NotFound") {
                    Ok(false)
                } else {
                    Err(CoreError::KeyPair(format!(
                        "failed to describe key pair: {:?}",
                        e
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl KeyPairSynchronizer for Ec2KeyPairSynchronizer {
    /// A key pair the cloud already knows is returned unchanged; otherwise
    /// EC2 generates a fresh one and the private key goes into state.
    async fn sync(&self, key_pair: KeyPair) -> Result<KeyPair, CoreError> {
        if !key_pair.name.is_empty() && self.exists(&key_pair.name).await? {
            return Ok(key_pair);
        }

        let name = if key_pair.name.is_empty() {
            format!("keypair-{}", Uuid::new_v4())
        } else {
            key_pair.name.clone()
        };

        tracing::debug!("creating key pair {}", name);
        let created = self
            .client
            .create_key_pair()
            .key_name(&name)
            .send()
            .await
            .map_err(|e| CoreError::KeyPair(format!("failed to create key pair: {:?}", e)))?;

        let private_key = created
            .key_material()
            .ok_or_else(|| {
                CoreError::KeyPair(format!("key pair {} came back without key material", name))
            })?
            .to_string();

        Ok(KeyPair {
            name,
            public_key: String::new(),
            private_key,
        })
    }
}

pub struct Ec2KeyPairDeleter {
    client: aws_sdk_ec2::Client,
}

impl Ec2KeyPairDeleter {
    pub fn new(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyPairDeleter for Ec2KeyPairDeleter {
    async fn delete(&self, name: &str) -> Result<(), CoreError> {
        self.client
            .delete_key_pair()
            .key_name(name)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                CoreError::KeyPair(format!("failed to delete key pair: {}", err_str))
            })
    }
}
