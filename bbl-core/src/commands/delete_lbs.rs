use std::sync::Arc;

use bbl_state::State;

use crate::error::{CoreError, ExecuteError, ExecuteResult};
use crate::logger::Logger;
use crate::managers::{
    AvailabilityZoneRetriever, BoshClientProvider, CertificateManager, CloudConfigManager,
    CloudConfigurator, CredentialValidator, InfrastructureManager,
};
use crate::types::lb_attached;

/// Detaches the load balancer from the stack and deletes its certificate
pub struct DeleteLbs {
    logger: Arc<dyn Logger>,
    credential_validator: Arc<dyn CredentialValidator>,
    certificate_manager: Arc<dyn CertificateManager>,
    infrastructure_manager: Arc<dyn InfrastructureManager>,
    availability_zone_retriever: Arc<dyn AvailabilityZoneRetriever>,
    bosh_client_provider: Arc<dyn BoshClientProvider>,
    cloud_configurator: Arc<dyn CloudConfigurator>,
    cloud_config_manager: Arc<dyn CloudConfigManager>,
}

impl DeleteLbs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        logger: Arc<dyn Logger>,
        credential_validator: Arc<dyn CredentialValidator>,
        certificate_manager: Arc<dyn CertificateManager>,
        infrastructure_manager: Arc<dyn InfrastructureManager>,
        availability_zone_retriever: Arc<dyn AvailabilityZoneRetriever>,
        bosh_client_provider: Arc<dyn BoshClientProvider>,
        cloud_configurator: Arc<dyn CloudConfigurator>,
        cloud_config_manager: Arc<dyn CloudConfigManager>,
    ) -> Self {
        Self {
            logger,
            credential_validator,
            certificate_manager,
            infrastructure_manager,
            availability_zone_retriever,
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

        if !lb_attached(&state.stack.lb_type) {
            return Err(CoreError::NoLbsFound);
        }

        if !self.infrastructure_manager.exists(&state.stack.name).await? {
            return Err(CoreError::EnvironmentNotFound);
        }

        let client = self.bosh_client_provider.client(
            &state.bosh.director_address,
            &state.bosh.director_username,
            &state.bosh.director_password,
        );
        if client.info().await.is_err() {
            return Err(CoreError::EnvironmentNotFound);
        }

        let azs = self
            .availability_zone_retriever
            .retrieve(&state.aws.region)
            .await?;

        self.logger.step("removing load balancer from stack");
        let stack = self
            .infrastructure_manager
            .update(&state.key_pair.name, azs.len(), "none", "", &state.stack.name)
            .await?;

        self.logger.step("deleting certificate");
        self.certificate_manager
            .delete(&state.stack.certificate_name)
            .await?;

        state.stack.lb_type = String::new();
        state.stack.certificate_name = String::new();

        let cloud_config_input = self.cloud_configurator.configure(&stack, &azs);
        self.cloud_config_manager
            .update(cloud_config_input, client.as_ref())
            .await?;

        Ok(())
    }
}
