use std::sync::Arc;

use bbl_state::State;
use chrono::Utc;

use crate::error::{CoreError, ExecuteError, ExecuteResult};
use crate::logger::Logger;
use crate::managers::{
    AvailabilityZoneRetriever, BoshClientProvider, BoshDeployer, CertificateManager,
    CloudConfigManager, CloudConfigurator, CredentialValidator, InfrastructureManager,
    KeyPairSynchronizer,
};
use crate::types::DeployInput;

/// Creates or updates the director and its supporting infrastructure.
///
/// Every step is a no-op when its effect is already in place, so re-running
/// `up` against an unchanged environment converges without cloud mutations.
pub struct Up {
    logger: Arc<dyn Logger>,
    credential_validator: Arc<dyn CredentialValidator>,
    key_pair_synchronizer: Arc<dyn KeyPairSynchronizer>,
    availability_zone_retriever: Arc<dyn AvailabilityZoneRetriever>,
    certificate_manager: Arc<dyn CertificateManager>,
    infrastructure_manager: Arc<dyn InfrastructureManager>,
    bosh_deployer: Arc<dyn BoshDeployer>,
    bosh_client_provider: Arc<dyn BoshClientProvider>,
    cloud_configurator: Arc<dyn CloudConfigurator>,
    cloud_config_manager: Arc<dyn CloudConfigManager>,
}

impl Up {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        logger: Arc<dyn Logger>,
        credential_validator: Arc<dyn CredentialValidator>,
        key_pair_synchronizer: Arc<dyn KeyPairSynchronizer>,
        availability_zone_retriever: Arc<dyn AvailabilityZoneRetriever>,
        certificate_manager: Arc<dyn CertificateManager>,
        infrastructure_manager: Arc<dyn InfrastructureManager>,
        bosh_deployer: Arc<dyn BoshDeployer>,
        bosh_client_provider: Arc<dyn BoshClientProvider>,
        cloud_configurator: Arc<dyn CloudConfigurator>,
        cloud_config_manager: Arc<dyn CloudConfigManager>,
    ) -> Self {
        Self {
            logger,
            credential_validator,
            key_pair_synchronizer,
            availability_zone_retriever,
            certificate_manager,
            infrastructure_manager,
            bosh_deployer,
            bosh_client_provider,
            cloud_configurator,
            cloud_config_manager,
        }
    }

    pub async fn execute(&self, state: State) -> ExecuteResult {
        let mut state = state;
        match self.run(&mut state).await {
            Ok(()) => Ok(state),
            Err(e) => Err(ExecuteError::new(state, e)),
        }
    }

    async fn run(&self, state: &mut State) -> Result<(), CoreError> {
        self.credential_validator.validate()?;

        self.logger.step("synchronizing key pair");
        state.key_pair = self
            .key_pair_synchronizer
            .sync(state.key_pair.clone())
            .await?;

        let azs = self
            .availability_zone_retriever
            .retrieve(&state.aws.region)
            .await?;

        if state.stack.name.is_empty() {
            state.stack.name = format!("bbl-aws-{}", Utc::now().format("%Y%m%d%H%M%S"));
        }

        // carry any attached lb forward through the stack update
        let lb_certificate_arn = if state.stack.certificate_name.is_empty() {
            String::new()
        } else {
            self.certificate_manager
                .describe(&state.stack.certificate_name)
                .await?
                .arn
        };

        self.logger.step("creating infrastructure");
        let stack = self
            .infrastructure_manager
            .update(
                &state.key_pair.name,
                azs.len(),
                &state.stack.lb_type,
                &lb_certificate_arn,
                &state.stack.name,
            )
            .await?;

        let director_was_absent = state.bosh.director_address.is_empty();

        let deploy_input = DeployInput {
            iam_user_access_key: stack.output("BOSHUserAccessKey").to_string(),
            iam_user_secret_key: stack.output("BOSHUserSecretAccessKey").to_string(),
            region: state.aws.region.clone(),
            subnet_id: stack.output("BOSHSubnet").to_string(),
            availability_zone: stack.output("BOSHSubnetAZ").to_string(),
            elastic_ip: stack.output("BOSHEIP").to_string(),
            security_group: stack.output("BOSHSecurityGroup").to_string(),
            key_pair_name: state.key_pair.name.clone(),
            private_key: state.key_pair.private_key.clone(),
            director_username: state.bosh.director_username.clone(),
            director_password: state.bosh.director_password.clone(),
            ssl_ca: state.bosh.director_ssl_ca.clone(),
            ssl_certificate: state.bosh.director_ssl_certificate.clone(),
            ssl_private_key: state.bosh.director_ssl_private_key.clone(),
            credentials: state.bosh.credentials.clone(),
            manifest: state.bosh.manifest.clone(),
        };

        let output = self.bosh_deployer.deploy(deploy_input).await?;

        state.bosh.director_address = format!("https://{}:25555", stack.output("BOSHEIP"));
        state.bosh.director_username = output.director_username;
        state.bosh.director_password = output.director_password;
        state.bosh.director_ssl_ca = output.ssl_ca;
        state.bosh.director_ssl_certificate = output.ssl_certificate;
        state.bosh.director_ssl_private_key = output.ssl_private_key;
        state.bosh.credentials = output.credentials;
        state.bosh.manifest = output.manifest;

        if director_was_absent {
            self.logger.step("generating cloud config");
            let client = self.bosh_client_provider.client(
                &state.bosh.director_address,
                &state.bosh.director_username,
                &state.bosh.director_password,
            );
            let cloud_config_input = self.cloud_configurator.configure(&stack, &azs);
            self.cloud_config_manager
                .update(cloud_config_input, client.as_ref())
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fakes::*;
    use crate::types::{Certificate, DeployOutput, Stack};
    use bbl_state::KeyPair;
    use std::collections::BTreeMap;
    use std::sync::atomic::Ordering;

    struct Setup {
        credential_validator: Arc<FakeCredentialValidator>,
        key_pair_synchronizer: Arc<FakeKeyPairSynchronizer>,
        availability_zone_retriever: Arc<FakeAvailabilityZoneRetriever>,
        certificate_manager: Arc<FakeCertificateManager>,
        infrastructure_manager: Arc<FakeInfrastructureManager>,
        bosh_deployer: Arc<FakeBoshDeployer>,
        bosh_client_provider: Arc<FakeBoshClientProvider>,
        cloud_config_manager: Arc<FakeCloudConfigManager>,
        command: Up,
    }

    fn setup() -> Setup {
        let logger = Arc::new(FakeLogger::default());
        let credential_validator = Arc::new(FakeCredentialValidator::default());
        let key_pair_synchronizer = Arc::new(FakeKeyPairSynchronizer::default());
        *key_pair_synchronizer.returns.lock().unwrap() = KeyPair {
            name: "some-key-pair".to_string(),
            public_key: String::new(),
            private_key: "some-private-key".to_string(),
        };
        let availability_zone_retriever = Arc::new(FakeAvailabilityZoneRetriever::default());
        *availability_zone_retriever.azs.lock().unwrap() =
            vec!["us-east-1a".to_string(), "us-east-1b".to_string()];
        let certificate_manager = Arc::new(FakeCertificateManager::default());
        let infrastructure_manager = Arc::new(FakeInfrastructureManager::default());
        let mut stack = Stack {
            name: "some-stack".to_string(),
            ..Stack::default()
        };
        for (k, v) in [
            ("BOSHSubnet", "subnet-12345"),
            ("BOSHSubnetAZ", "us-east-1a"),
            ("BOSHEIP", "192.0.2.10"),
            ("BOSHSecurityGroup", "sg-12345"),
            ("BOSHUserAccessKey", "some-bosh-access-key"),
            ("BOSHUserSecretAccessKey", "some-bosh-secret-key"),
        ] {
            stack.outputs.insert(k.to_string(), v.to_string());
        }
        *infrastructure_manager.update_returns.lock().unwrap() = stack;

        let bosh_deployer = Arc::new(FakeBoshDeployer::default());
        *bosh_deployer.returns.lock().unwrap() = DeployOutput {
            director_username: "some-director-username".to_string(),
            director_password: "some-director-password".to_string(),
            ssl_ca: "some-ca".to_string(),
            ssl_certificate: "some-certificate".to_string(),
            ssl_private_key: "some-ssl-key".to_string(),
            credentials: BTreeMap::from([(
                "mbusPassword".to_string(),
                "some-mbus-password".to_string(),
            )]),
            manifest: "name: bosh".to_string(),
        };
        let bosh_client = Arc::new(FakeBoshClient::default());
        let bosh_client_provider = Arc::new(FakeBoshClientProvider::new(bosh_client));
        let cloud_configurator = Arc::new(FakeCloudConfigurator::default());
        let cloud_config_manager = Arc::new(FakeCloudConfigManager::default());

        let command = Up::new(
            logger,
            credential_validator.clone(),
            key_pair_synchronizer.clone(),
            availability_zone_retriever.clone(),
            certificate_manager.clone(),
            infrastructure_manager.clone(),
            bosh_deployer.clone(),
            bosh_client_provider.clone(),
            cloud_configurator,
            cloud_config_manager.clone(),
        );

        Setup {
            credential_validator,
            key_pair_synchronizer,
            availability_zone_retriever,
            certificate_manager,
            infrastructure_manager,
            bosh_deployer,
            bosh_client_provider,
            cloud_config_manager,
            command,
        }
    }

    fn incoming_state() -> State {
        let mut state = State::new();
        state.aws.access_key_id = "some-access-key-id".to_string();
        state.aws.secret_access_key = "some-secret-access-key".to_string();
        state.aws.region = "us-east-1".to_string();
        state
    }

    #[tokio::test]
    async fn errors_when_credential_validation_fails() {
        let s = setup();
        *s.credential_validator.error.lock().unwrap() =
            Some("failed to validate aws credentials".to_string());

        let err = s.command.execute(incoming_state()).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to validate aws credentials");
    }

    #[tokio::test]
    async fn synchronizes_the_key_pair_and_persists_it() {
        let s = setup();

        let state = s.command.execute(incoming_state()).await.unwrap();

        assert!(s.key_pair_synchronizer.received.lock().unwrap().is_some());
        assert_eq!(state.key_pair.name, "some-key-pair");
        assert_eq!(state.key_pair.private_key, "some-private-key");
    }

    #[tokio::test]
    async fn generates_a_stack_name_on_first_up_and_reuses_it_afterwards() {
        let s = setup();

        let state = s.command.execute(incoming_state()).await.unwrap();
        assert!(state.stack.name.starts_with("bbl-aws-"));

        let s = setup();
        let mut state = incoming_state();
        state.stack.name = "existing-stack".to_string();
        let state = s.command.execute(state).await.unwrap();

        assert_eq!(state.stack.name, "existing-stack");
        let update = s.infrastructure_manager.update_received.lock().unwrap();
        assert_eq!(update.as_ref().unwrap().stack_name, "existing-stack");
    }

    #[tokio::test]
    async fn carries_an_attached_lb_forward() {
        let s = setup();
        *s.certificate_manager.describe_returns.lock().unwrap() = Certificate {
            name: "some-certificate".to_string(),
            arn: "some-certificate-arn".to_string(),
        };
        let mut state = incoming_state();
        state.stack.name = "existing-stack".to_string();
        state.stack.lb_type = "cf".to_string();
        state.stack.certificate_name = "some-certificate".to_string();

        s.command.execute(state).await.unwrap();

        assert_eq!(
            s.certificate_manager
                .describe_received_name
                .lock()
                .unwrap()
                .as_deref(),
            Some("some-certificate")
        );
        let update = s.infrastructure_manager.update_received.lock().unwrap();
        let update = update.as_ref().unwrap();
        assert_eq!(update.lb_type, "cf");
        assert_eq!(update.lb_certificate_arn, "some-certificate-arn");
        assert_eq!(update.availability_zone_count, 2);
    }

    #[tokio::test]
    async fn deploys_the_director_from_stack_outputs() {
        let s = setup();

        let state = s.command.execute(incoming_state()).await.unwrap();

        let input = s.bosh_deployer.received_input.lock().unwrap();
        let input = input.as_ref().unwrap();
        assert_eq!(input.subnet_id, "subnet-12345");
        assert_eq!(input.availability_zone, "us-east-1a");
        assert_eq!(input.elastic_ip, "192.0.2.10");
        assert_eq!(input.security_group, "sg-12345");
        assert_eq!(input.iam_user_access_key, "some-bosh-access-key");
        assert_eq!(input.iam_user_secret_key, "some-bosh-secret-key");
        assert_eq!(input.key_pair_name, "some-key-pair");
        assert_eq!(input.private_key, "some-private-key");
        assert_eq!(input.region, "us-east-1");

        assert_eq!(state.bosh.director_address, "https://192.0.2.10:25555");
        assert_eq!(state.bosh.director_username, "some-director-username");
        assert_eq!(state.bosh.director_password, "some-director-password");
        assert_eq!(state.bosh.manifest, "name: bosh");
        assert_eq!(
            state.bosh.credentials.get("mbusPassword").map(String::as_str),
            Some("some-mbus-password")
        );
    }

    #[tokio::test]
    async fn feeds_prior_credentials_back_into_the_deployer() {
        let s = setup();
        let mut state = incoming_state();
        state.bosh.director_address = "https://192.0.2.10:25555".to_string();
        state.bosh.director_username = "existing-username".to_string();
        state.bosh.director_password = "existing-password".to_string();
        state.bosh.manifest = "name: bosh\nexisting: true".to_string();
        state
            .bosh
            .credentials
            .insert("natsPassword".to_string(), "existing-nats".to_string());

        s.command.execute(state).await.unwrap();

        let input = s.bosh_deployer.received_input.lock().unwrap();
        let input = input.as_ref().unwrap();
        assert_eq!(input.director_username, "existing-username");
        assert_eq!(input.director_password, "existing-password");
        assert_eq!(input.manifest, "name: bosh\nexisting: true");
        assert_eq!(
            input.credentials.get("natsPassword").map(String::as_str),
            Some("existing-nats")
        );
    }

    #[tokio::test]
    async fn generates_the_cloud_config_only_for_a_fresh_director() {
        let s = setup();
        s.command.execute(incoming_state()).await.unwrap();
        assert_eq!(s.cloud_config_manager.call_count.load(Ordering::SeqCst), 1);
        let received = s.bosh_client_provider.received.lock().unwrap();
        assert_eq!(
            received.as_ref().unwrap(),
            &(
                "https://192.0.2.10:25555".to_string(),
                "some-director-username".to_string(),
                "some-director-password".to_string()
            )
        );

        let s = setup();
        let mut state = incoming_state();
        state.bosh.director_address = "https://192.0.2.10:25555".to_string();
        s.command.execute(state).await.unwrap();
        assert_eq!(s.cloud_config_manager.call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn running_up_twice_produces_an_identical_state() {
        let s = setup();
        let first = s.command.execute(incoming_state()).await.unwrap();

        let s = setup();
        let second = s.command.execute(first.clone()).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn keeps_the_synchronized_key_pair_when_a_later_step_fails() {
        let s = setup();
        *s.infrastructure_manager.update_error.lock().unwrap() =
            Some("failed to create infrastructure".to_string());

        let err = s.command.execute(incoming_state()).await.unwrap_err();

        assert_eq!(err.to_string(), "failed to create infrastructure");
        assert_eq!(err.state.key_pair.name, "some-key-pair");
    }

    #[tokio::test]
    async fn retrieves_azs_for_the_state_region() {
        let s = setup();
        s.command.execute(incoming_state()).await.unwrap();
        assert_eq!(
            s.availability_zone_retriever
                .received_region
                .lock()
                .unwrap()
                .as_deref(),
            Some("us-east-1")
        );
    }
}
