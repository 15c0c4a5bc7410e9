use std::path::PathBuf;
use std::sync::Arc;

use bbl_state::State;

use crate::error::{CoreError, ExecuteError, ExecuteResult};
use crate::logger::Logger;
use crate::managers::{
    AvailabilityZoneRetriever, BoshClientProvider, CertificateManager, CertificateValidator,
    CredentialValidator, InfrastructureManager,
};
use crate::types::lb_attached;

#[derive(Debug, Clone, Default)]
pub struct UpdateLbsArgs {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub chain: Option<PathBuf>,
}

/// Rotates the certificate on the attached load balancer.
///
/// The old certificate is deleted only after the stack update confirms the
/// new one is in use; deleting an in-use certificate fails cloud-side.
pub struct UpdateLbs {
    logger: Arc<dyn Logger>,
    credential_validator: Arc<dyn CredentialValidator>,
    certificate_manager: Arc<dyn CertificateManager>,
    infrastructure_manager: Arc<dyn InfrastructureManager>,
    availability_zone_retriever: Arc<dyn AvailabilityZoneRetriever>,
    bosh_client_provider: Arc<dyn BoshClientProvider>,
    certificate_validator: Arc<dyn CertificateValidator>,
}

impl UpdateLbs {
    pub fn new(
        logger: Arc<dyn Logger>,
        credential_validator: Arc<dyn CredentialValidator>,
        certificate_manager: Arc<dyn CertificateManager>,
        infrastructure_manager: Arc<dyn InfrastructureManager>,
        availability_zone_retriever: Arc<dyn AvailabilityZoneRetriever>,
        bosh_client_provider: Arc<dyn BoshClientProvider>,
        certificate_validator: Arc<dyn CertificateValidator>,
    ) -> Self {
        Self {
            logger,
            credential_validator,
            certificate_manager,
            infrastructure_manager,
            availability_zone_retriever,
            bosh_client_provider,
            certificate_validator,
        }
    }

    pub async fn execute(&self, args: UpdateLbsArgs, state: State) -> ExecuteResult {
        let mut state = state;
        match self.run(&args, &mut state).await {
            Ok(()) => Ok(state),
            Err(e) => Err(ExecuteError::new(state, e)),
        }
    }

    async fn run(&self, args: &UpdateLbsArgs, state: &mut State) -> Result<(), CoreError> {
        self.credential_validator.validate()?;

        self.certificate_validator
            .validate(&args.cert, &args.key, args.chain.as_deref())?;

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

        self.logger.step("uploading new certificate");
        let new_certificate_name = self
            .certificate_manager
            .create(&args.cert, &args.key, args.chain.as_deref())
            .await?;

        let certificate = self
            .certificate_manager
            .describe(&new_certificate_name)
            .await?;

        let azs = self
            .availability_zone_retriever
            .retrieve(&state.aws.region)
            .await?;

        self.infrastructure_manager
            .update(
                &state.key_pair.name,
                azs.len(),
                &state.stack.lb_type,
                &certificate.arn,
                &state.stack.name,
            )
            .await?;

        let old_certificate_name =
            std::mem::replace(&mut state.stack.certificate_name, new_certificate_name);

        self.logger.step("deleting old certificate");
        self.certificate_manager.delete(&old_certificate_name).await?;

        Ok(())
    }
}
