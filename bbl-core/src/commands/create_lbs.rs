use std::path::PathBuf;
use std::sync::Arc;

use bbl_state::State;

use crate::error::{CoreError, ExecuteError, ExecuteResult};
use crate::logger::Logger;
use crate::managers::{
    AvailabilityZoneRetriever, BoshClientProvider, CertificateManager, CertificateValidator,
    CloudConfigManager, CloudConfigurator, CredentialValidator, InfrastructureManager,
};
use crate::types::{LbType, lb_attached};

#[derive(Debug, Clone, Default)]
pub struct CreateLbsArgs {
    pub lb_type: String,
    pub cert: PathBuf,
    pub key: PathBuf,
    pub chain: Option<PathBuf>,
    pub skip_if_exists: bool,
}

/// Attaches a load balancer to the stack and teaches the director about it
pub struct CreateLbs {
    logger: Arc<dyn Logger>,
    credential_validator: Arc<dyn CredentialValidator>,
    certificate_manager: Arc<dyn CertificateManager>,
    infrastructure_manager: Arc<dyn InfrastructureManager>,
    availability_zone_retriever: Arc<dyn AvailabilityZoneRetriever>,
    bosh_client_provider: Arc<dyn BoshClientProvider>,
    cloud_configurator: Arc<dyn CloudConfigurator>,
    cloud_config_manager: Arc<dyn CloudConfigManager>,
    certificate_validator: Arc<dyn CertificateValidator>,
}

impl CreateLbs {
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
        certificate_validator: Arc<dyn CertificateValidator>,
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
            certificate_validator,
        }
    }

    pub async fn execute(&self, args: CreateLbsArgs, state: State) -> ExecuteResult {
        let mut state = state;
        match self.run(&args, &mut state).await {
            Ok(()) => Ok(state),
            Err(e) => Err(ExecuteError::new(state, e)),
        }
    }

    async fn run(&self, args: &CreateLbsArgs, state: &mut State) -> Result<(), CoreError> {
        self.credential_validator.validate()?;

        self.certificate_validator
            .validate(&args.cert, &args.key, args.chain.as_deref())?;

        let lb_type = LbType::parse(&args.lb_type)?;

        if lb_attached(&state.stack.lb_type) {
            if args.skip_if_exists {
                self.logger.println(&format!(
                    "lb type \"{}\" exists, skipping...",
                    state.stack.lb_type
                ));
                return Ok(());
            }
            return Err(CoreError::LbAlreadyAttached(state.stack.lb_type.clone()));
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

        self.logger.step("uploading certificate");
        let certificate_name = self
            .certificate_manager
            .create(&args.cert, &args.key, args.chain.as_deref())
            .await?;
        state.stack.certificate_name = certificate_name.clone();

        let certificate = self.certificate_manager.describe(&certificate_name).await?;

        let azs = self
            .availability_zone_retriever
            .retrieve(&state.aws.region)
            .await?;

        let stack = self
            .infrastructure_manager
            .update(
                &state.key_pair.name,
                azs.len(),
                lb_type.as_str(),
                &certificate.arn,
                &state.stack.name,
            )
            .await?;

        let cloud_config_input = self.cloud_configurator.configure(&stack, &azs);
        self.cloud_config_manager
            .update(cloud_config_input, client.as_ref())
            .await?;

        state.stack.lb_type = lb_type.as_str().to_string();

        Ok(())
    }
}
