//! Recording fakes for the collaborator traits
//!
//! Each fake records the arguments it received and returns canned values
//! configured through its public fields, so command tests can assert on
//! call counts and exact inputs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bbl_state::KeyPair;

use crate::error::CoreError;
use crate::logger::Logger;
use crate::managers::{
    AvailabilityZoneRetriever, BoshClient, BoshClientProvider, BoshDeployer, CertificateManager,
    CertificateValidator, CloudConfigManager, CloudConfigurator, CredentialValidator,
    InfrastructureManager, KeyPairDeleter, KeyPairSynchronizer,
};
use crate::types::{
    BoshInfo, Certificate, CloudConfigInput, DeployInput, DeployOutput, Stack,
};

fn canned(error: &Mutex<Option<String>>, wrap: fn(String) -> CoreError) -> Result<(), CoreError> {
    match error.lock().unwrap().as_ref() {
        Some(message) => Err(wrap(message.clone())),
        None => Ok(()),
    }
}

/// A clonable in-memory stdout for asserting printed output
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeLogger {
    pub steps: Mutex<Vec<String>>,
    pub printlns: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub prompt_response: Mutex<bool>,
}

impl Logger for FakeLogger {
    fn step(&self, message: &str) {
        self.steps.lock().unwrap().push(message.to_string());
    }

    fn println(&self, message: &str) {
        self.printlns.lock().unwrap().push(message.to_string());
    }

    fn prompt(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        *self.prompt_response.lock().unwrap()
    }
}

#[derive(Default)]
pub struct FakeCredentialValidator {
    pub error: Mutex<Option<String>>,
}

impl CredentialValidator for FakeCredentialValidator {
    fn validate(&self) -> Result<(), CoreError> {
        canned(&self.error, CoreError::Credentials)
    }
}

#[derive(Default)]
pub struct FakeCertificateValidator {
    pub error: Mutex<Option<String>>,
    pub received: Mutex<Option<(PathBuf, PathBuf, Option<PathBuf>)>>,
}

impl CertificateValidator for FakeCertificateValidator {
    fn validate(
        &self,
        certificate_path: &Path,
        key_path: &Path,
        chain_path: Option<&Path>,
    ) -> Result<(), CoreError> {
        *self.received.lock().unwrap() = Some((
            certificate_path.to_path_buf(),
            key_path.to_path_buf(),
            chain_path.map(Path::to_path_buf),
        ));
        canned(&self.error, CoreError::CertificateValidation)
    }
}

#[derive(Default)]
pub struct FakeCertificateManager {
    pub create_returns_name: Mutex<String>,
    pub create_error: Mutex<Option<String>>,
    pub create_call_count: AtomicUsize,
    pub create_received: Mutex<Option<(PathBuf, PathBuf, Option<PathBuf>)>>,
    pub describe_returns: Mutex<Certificate>,
    pub describe_error: Mutex<Option<String>>,
    pub describe_received_name: Mutex<Option<String>>,
    pub delete_error: Mutex<Option<String>>,
    pub delete_call_count: AtomicUsize,
    pub delete_received_name: Mutex<Option<String>>,
}

#[async_trait]
impl CertificateManager for FakeCertificateManager {
    async fn create(
        &self,
        certificate_path: &Path,
        private_key_path: &Path,
        chain_path: Option<&Path>,
    ) -> Result<String, CoreError> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        *self.create_received.lock().unwrap() = Some((
            certificate_path.to_path_buf(),
            private_key_path.to_path_buf(),
            chain_path.map(Path::to_path_buf),
        ));
        canned(&self.create_error, CoreError::Certificate)?;
        Ok(self.create_returns_name.lock().unwrap().clone())
    }

    async fn describe(&self, certificate_name: &str) -> Result<Certificate, CoreError> {
        *self.describe_received_name.lock().unwrap() = Some(certificate_name.to_string());
        canned(&self.describe_error, CoreError::Certificate)?;
        Ok(self.describe_returns.lock().unwrap().clone())
    }

    async fn delete(&self, certificate_name: &str) -> Result<(), CoreError> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        *self.delete_received_name.lock().unwrap() = Some(certificate_name.to_string());
        canned(&self.delete_error, CoreError::Certificate)
    }
}

pub struct UpdateCall {
    pub key_pair_name: String,
    pub availability_zone_count: usize,
    pub lb_type: String,
    pub lb_certificate_arn: String,
    pub stack_name: String,
}

#[derive(Default)]
pub struct FakeInfrastructureManager {
    pub exists_returns: Mutex<bool>,
    pub exists_error: Mutex<Option<String>>,
    pub exists_received_name: Mutex<Option<String>>,
    pub describe_returns: Mutex<Stack>,
    pub describe_error: Mutex<Option<String>>,
    pub describe_received_name: Mutex<Option<String>>,
    pub update_returns: Mutex<Stack>,
    pub update_error: Mutex<Option<String>>,
    pub update_call_count: AtomicUsize,
    pub update_received: Mutex<Option<UpdateCall>>,
    pub delete_error: Mutex<Option<String>>,
    pub delete_received_name: Mutex<Option<String>>,
}

#[async_trait]
impl InfrastructureManager for FakeInfrastructureManager {
    async fn exists(&self, stack_name: &str) -> Result<bool, CoreError> {
        *self.exists_received_name.lock().unwrap() = Some(stack_name.to_string());
        canned(&self.exists_error, CoreError::Infrastructure)?;
        Ok(*self.exists_returns.lock().unwrap())
    }

    async fn describe(&self, stack_name: &str) -> Result<Stack, CoreError> {
        *self.describe_received_name.lock().unwrap() = Some(stack_name.to_string());
        canned(&self.describe_error, CoreError::Infrastructure)?;
        Ok(self.describe_returns.lock().unwrap().clone())
    }

    async fn update(
        &self,
        key_pair_name: &str,
        availability_zone_count: usize,
        lb_type: &str,
        lb_certificate_arn: &str,
        stack_name: &str,
    ) -> Result<Stack, CoreError> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        *self.update_received.lock().unwrap() = Some(UpdateCall {
            key_pair_name: key_pair_name.to_string(),
            availability_zone_count,
            lb_type: lb_type.to_string(),
            lb_certificate_arn: lb_certificate_arn.to_string(),
            stack_name: stack_name.to_string(),
        });
        canned(&self.update_error, CoreError::Infrastructure)?;
        Ok(self.update_returns.lock().unwrap().clone())
    }

    async fn delete(&self, stack_name: &str) -> Result<(), CoreError> {
        *self.delete_received_name.lock().unwrap() = Some(stack_name.to_string());
        canned(&self.delete_error, CoreError::Infrastructure)
    }
}

#[derive(Default)]
pub struct FakeAvailabilityZoneRetriever {
    pub azs: Mutex<Vec<String>>,
    pub error: Mutex<Option<String>>,
    pub received_region: Mutex<Option<String>>,
}

#[async_trait]
impl AvailabilityZoneRetriever for FakeAvailabilityZoneRetriever {
    async fn retrieve(&self, region: &str) -> Result<Vec<String>, CoreError> {
        *self.received_region.lock().unwrap() = Some(region.to_string());
        canned(&self.error, CoreError::AvailabilityZones)?;
        Ok(self.azs.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeKeyPairSynchronizer {
    pub returns: Mutex<KeyPair>,
    pub error: Mutex<Option<String>>,
    pub received: Mutex<Option<KeyPair>>,
}

#[async_trait]
impl KeyPairSynchronizer for FakeKeyPairSynchronizer {
    async fn sync(&self, key_pair: KeyPair) -> Result<KeyPair, CoreError> {
        *self.received.lock().unwrap() = Some(key_pair);
        canned(&self.error, CoreError::KeyPair)?;
        Ok(self.returns.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeKeyPairDeleter {
    pub error: Mutex<Option<String>>,
    pub call_count: AtomicUsize,
    pub received_name: Mutex<Option<String>>,
}

#[async_trait]
impl KeyPairDeleter for FakeKeyPairDeleter {
    async fn delete(&self, name: &str) -> Result<(), CoreError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.received_name.lock().unwrap() = Some(name.to_string());
        canned(&self.error, CoreError::KeyPair)
    }
}

#[derive(Default)]
pub struct FakeBoshClient {
    pub info_error: Mutex<Option<String>>,
    pub info_call_count: AtomicUsize,
    pub cloud_configs: Mutex<Vec<String>>,
    pub cloud_config_error: Mutex<Option<String>>,
    pub deployments_returns: Mutex<Vec<String>>,
    pub deployments_error: Mutex<Option<String>>,
    pub deleted_deployments: Mutex<Vec<String>>,
}

#[async_trait]
impl BoshClient for FakeBoshClient {
    async fn info(&self) -> Result<BoshInfo, CoreError> {
        self.info_call_count.fetch_add(1, Ordering::SeqCst);
        canned(&self.info_error, CoreError::Bosh)?;
        Ok(BoshInfo::default())
    }

    async fn update_cloud_config(&self, cloud_config_yaml: &str) -> Result<(), CoreError> {
        self.cloud_configs
            .lock()
            .unwrap()
            .push(cloud_config_yaml.to_string());
        canned(&self.cloud_config_error, CoreError::Bosh)
    }

    async fn deployments(&self) -> Result<Vec<String>, CoreError> {
        canned(&self.deployments_error, CoreError::Bosh)?;
        Ok(self.deployments_returns.lock().unwrap().clone())
    }

    async fn delete_deployment(&self, name: &str) -> Result<(), CoreError> {
        self.deleted_deployments.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

pub struct FakeBoshClientProvider {
    pub client: Arc<FakeBoshClient>,
    pub received: Mutex<Option<(String, String, String)>>,
}

impl FakeBoshClientProvider {
    pub fn new(client: Arc<FakeBoshClient>) -> Self {
        Self {
            client,
            received: Mutex::new(None),
        }
    }
}

impl BoshClientProvider for FakeBoshClientProvider {
    fn client(
        &self,
        director_address: &str,
        director_username: &str,
        director_password: &str,
    ) -> Arc<dyn BoshClient> {
        *self.received.lock().unwrap() = Some((
            director_address.to_string(),
            director_username.to_string(),
            director_password.to_string(),
        ));
        self.client.clone()
    }
}

#[derive(Default)]
pub struct FakeBoshDeployer {
    pub returns: Mutex<DeployOutput>,
    pub deploy_error: Mutex<Option<String>>,
    pub received_input: Mutex<Option<DeployInput>>,
    pub delete_error: Mutex<Option<String>>,
    pub delete_received: Mutex<Option<(String, String)>>,
}

#[async_trait]
impl BoshDeployer for FakeBoshDeployer {
    async fn deploy(&self, input: DeployInput) -> Result<DeployOutput, CoreError> {
        *self.received_input.lock().unwrap() = Some(input);
        canned(&self.deploy_error, CoreError::Bosh)?;
        Ok(self.returns.lock().unwrap().clone())
    }

    async fn delete(&self, manifest: &str, private_key: &str) -> Result<(), CoreError> {
        *self.delete_received.lock().unwrap() =
            Some((manifest.to_string(), private_key.to_string()));
        canned(&self.delete_error, CoreError::Bosh)
    }
}

#[derive(Default)]
pub struct FakeCloudConfigurator {
    pub returns: Mutex<CloudConfigInput>,
    pub received: Mutex<Option<(Stack, Vec<String>)>>,
}

impl CloudConfigurator for FakeCloudConfigurator {
    fn configure(&self, stack: &Stack, azs: &[String]) -> CloudConfigInput {
        *self.received.lock().unwrap() = Some((stack.clone(), azs.to_vec()));
        self.returns.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeCloudConfigManager {
    pub error: Mutex<Option<String>>,
    pub call_count: AtomicUsize,
    pub received_input: Mutex<Option<CloudConfigInput>>,
}

#[async_trait]
impl CloudConfigManager for FakeCloudConfigManager {
    async fn update(
        &self,
        input: CloudConfigInput,
        _client: &dyn BoshClient,
    ) -> Result<(), CoreError> {
        *self.received_input.lock().unwrap() = Some(input);
        canned(&self.error, CoreError::CloudConfig)?;
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
