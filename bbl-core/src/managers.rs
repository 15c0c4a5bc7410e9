//! Collaborator traits commands drive
//!
//! Each trait is a narrow capability surface over one external system.
//! Instances are passed explicitly into command constructors; credentials
//! and region flow through parameters, never through process-wide state.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bbl_state::KeyPair;

use crate::error::CoreError;
use crate::types::{BoshInfo, Certificate, CloudConfigInput, DeployInput, DeployOutput, Stack};

/// CRUD of the cloud stack bbl manages. `update` converges the stack to the
/// template for the given inputs, creating it when absent, and blocks until
/// the cloud reports a terminal state.
#[async_trait]
pub trait InfrastructureManager: Send + Sync {
    async fn exists(&self, stack_name: &str) -> Result<bool, CoreError>;
    async fn describe(&self, stack_name: &str) -> Result<Stack, CoreError>;
    async fn update(
        &self,
        key_pair_name: &str,
        availability_zone_count: usize,
        lb_type: &str,
        lb_certificate_arn: &str,
        stack_name: &str,
    ) -> Result<Stack, CoreError>;
    async fn delete(&self, stack_name: &str) -> Result<(), CoreError>;
}

/// Upload, describe and delete TLS certificates. `create` generates a fresh
/// unique name per call; identical content is never deduplicated.
#[async_trait]
pub trait CertificateManager: Send + Sync {
    async fn create(
        &self,
        certificate_path: &Path,
        private_key_path: &Path,
        chain_path: Option<&Path>,
    ) -> Result<String, CoreError>;
    async fn describe(&self, certificate_name: &str) -> Result<Certificate, CoreError>;
    async fn delete(&self, certificate_name: &str) -> Result<(), CoreError>;
}

/// Availability zone names for a region, in the cloud's order
#[async_trait]
pub trait AvailabilityZoneRetriever: Send + Sync {
    async fn retrieve(&self, region: &str) -> Result<Vec<String>, CoreError>;
}

/// Ensure the state's key pair exists in the cloud, creating one when the
/// name is unset or unknown. Returns the key pair to persist.
#[async_trait]
pub trait KeyPairSynchronizer: Send + Sync {
    async fn sync(&self, key_pair: KeyPair) -> Result<KeyPair, CoreError>;
}

#[async_trait]
pub trait KeyPairDeleter: Send + Sync {
    async fn delete(&self, name: &str) -> Result<(), CoreError>;
}

/// Fail-fast check that AWS credentials are present
pub trait CredentialValidator: Send + Sync {
    fn validate(&self) -> Result<(), CoreError>;
}

/// Syntactic check of user-supplied certificate files before upload
pub trait CertificateValidator: Send + Sync {
    fn validate(
        &self,
        certificate_path: &Path,
        key_path: &Path,
        chain_path: Option<&Path>,
    ) -> Result<(), CoreError>;
}

/// Builds a director client for the given endpoint and credentials
pub trait BoshClientProvider: Send + Sync {
    fn client(
        &self,
        director_address: &str,
        director_username: &str,
        director_password: &str,
    ) -> Arc<dyn BoshClient>;
}

/// The BOSH director HTTP API
#[async_trait]
pub trait BoshClient: Send + Sync {
    /// Health probe; a single failure means the director is unreachable
    async fn info(&self) -> Result<BoshInfo, CoreError>;
    async fn update_cloud_config(&self, cloud_config_yaml: &str) -> Result<(), CoreError>;
    async fn deployments(&self) -> Result<Vec<String>, CoreError>;
    async fn delete_deployment(&self, name: &str) -> Result<(), CoreError>;
}

/// Drives the external bosh-init binary
#[async_trait]
pub trait BoshDeployer: Send + Sync {
    async fn deploy(&self, input: DeployInput) -> Result<DeployOutput, CoreError>;
    async fn delete(&self, manifest: &str, private_key: &str) -> Result<(), CoreError>;
}

/// Pure translation of stack + AZ facts into a cloud-config input
pub trait CloudConfigurator: Send + Sync {
    fn configure(&self, stack: &Stack, azs: &[String]) -> CloudConfigInput;
}

/// Renders a cloud-config document and uploads it to the director
#[async_trait]
pub trait CloudConfigManager: Send + Sync {
    async fn update(
        &self,
        input: CloudConfigInput,
        client: &dyn BoshClient,
    ) -> Result<(), CoreError>;
}
