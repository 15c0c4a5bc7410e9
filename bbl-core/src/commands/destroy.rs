use std::sync::Arc;

use bbl_state::State;

use crate::error::{CoreError, ExecuteError, ExecuteResult};
use crate::logger::Logger;
use crate::managers::{
    BoshClientProvider, BoshDeployer, CertificateManager, CredentialValidator,
    InfrastructureManager, KeyPairDeleter,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DestroyArgs {
    pub no_confirm: bool,
}

/// Tears the environment down in reverse dependency order: director
/// deployments, the director VM, the stack, the key pair, the certificate.
/// Steps whose resource is already gone succeed silently; the resulting
/// empty state tells the dispatcher to erase the state file.
pub struct Destroy {
    logger: Arc<dyn Logger>,
    credential_validator: Arc<dyn CredentialValidator>,
    infrastructure_manager: Arc<dyn InfrastructureManager>,
    bosh_deployer: Arc<dyn BoshDeployer>,
    bosh_client_provider: Arc<dyn BoshClientProvider>,
    key_pair_deleter: Arc<dyn KeyPairDeleter>,
    certificate_manager: Arc<dyn CertificateManager>,
}

impl Destroy {
    pub fn new(
        logger: Arc<dyn Logger>,
        credential_validator: Arc<dyn CredentialValidator>,
        infrastructure_manager: Arc<dyn InfrastructureManager>,
        bosh_deployer: Arc<dyn BoshDeployer>,
        bosh_client_provider: Arc<dyn BoshClientProvider>,
        key_pair_deleter: Arc<dyn KeyPairDeleter>,
        certificate_manager: Arc<dyn CertificateManager>,
    ) -> Self {
        Self {
            logger,
            credential_validator,
            infrastructure_manager,
            bosh_deployer,
            bosh_client_provider,
            key_pair_deleter,
            certificate_manager,
        }
    }

    pub async fn execute(&self, args: DestroyArgs, state: State) -> ExecuteResult {
        if !args.no_confirm
            && !self.logger.prompt(
                "Are you sure you want to delete your bbl environment? This operation cannot be undone!",
            )
        {
            self.logger.println("destroy cancelled");
            return Ok(state);
        }

        let mut state = state;
        match self.run(&mut state).await {
            Ok(()) => Ok(state),
            Err(e) => Err(ExecuteError::new(state, e)),
        }
    }

    async fn run(&self, state: &mut State) -> Result<(), CoreError> {
        self.credential_validator.validate()?;

        if !state.bosh.director_address.is_empty() {
            let client = self.bosh_client_provider.client(
                &state.bosh.director_address,
                &state.bosh.director_username,
                &state.bosh.director_password,
            );
            match client.info().await {
                Ok(_) => {
                    self.logger.step("deleting bosh deployments");
                    for deployment in client.deployments().await? {
                        client.delete_deployment(&deployment).await?;
                    }
                }
                Err(_) => {
                    // director already unreachable, nothing to tear down
                    self.logger.println("no bosh director found, skipping deployment deletion");
                }
            }
        }

        if !state.bosh.manifest.is_empty() {
            self.logger.step("destroying bosh director");
            self.bosh_deployer
                .delete(&state.bosh.manifest, &state.key_pair.private_key)
                .await?;
        }
        state.bosh = Default::default();

        if !state.stack.name.is_empty() {
            if self.infrastructure_manager.exists(&state.stack.name).await? {
                self.logger.step("destroying AWS stack");
                self.infrastructure_manager.delete(&state.stack.name).await?;
            }
            state.stack.name = String::new();
            state.stack.lb_type = String::new();
        }

        if !state.key_pair.name.is_empty() {
            self.logger.step("deleting keypair");
            self.key_pair_deleter.delete(&state.key_pair.name).await?;
            state.key_pair = Default::default();
        }

        if !state.stack.certificate_name.is_empty() {
            self.logger.step("deleting certificate");
            self.certificate_manager
                .delete(&state.stack.certificate_name)
                .await?;
            state.stack.certificate_name = String::new();
        }

        *state = State::new();

        Ok(())
    }
}
