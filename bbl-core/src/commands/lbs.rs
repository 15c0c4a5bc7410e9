use std::sync::Arc;

use bbl_state::State;

use crate::commands::{Stdout, write_line};
use crate::error::{CoreError, ExecuteError, ExecuteResult};
use crate::managers::{CredentialValidator, InfrastructureManager};

/// Read-only report of the attached load balancers
pub struct Lbs {
    credential_validator: Arc<dyn CredentialValidator>,
    infrastructure_manager: Arc<dyn InfrastructureManager>,
    stdout: Stdout,
}

impl Lbs {
    pub fn new(
        credential_validator: Arc<dyn CredentialValidator>,
        infrastructure_manager: Arc<dyn InfrastructureManager>,
        stdout: Stdout,
    ) -> Self {
        Self {
            credential_validator,
            infrastructure_manager,
            stdout,
        }
    }

    pub async fn execute(&self, state: State) -> ExecuteResult {
        match self.run(&state).await {
            Ok(()) => Ok(state),
            Err(e) => Err(ExecuteError::new(state, e)),
        }
    }

    async fn run(&self, state: &State) -> Result<(), CoreError> {
        self.credential_validator.validate()?;

        let stack = self.infrastructure_manager.describe(&state.stack.name).await?;

        match state.stack.lb_type.as_str() {
            "cf" => {
                write_line(
                    &self.stdout,
                    &format!(
                        "CF Router LB: {} [{}]",
                        stack.output("CFRouterLoadBalancer"),
                        stack.output("CFRouterLoadBalancerURL")
                    ),
                );
                write_line(
                    &self.stdout,
                    &format!(
                        "CF SSH Proxy LB: {} [{}]",
                        stack.output("CFSSHProxyLoadBalancer"),
                        stack.output("CFSSHProxyLoadBalancerURL")
                    ),
                );
            }
            "concourse" => {
                write_line(
                    &self.stdout,
                    &format!(
                        "Concourse LB: {} [{}]",
                        stack.output("ConcourseLoadBalancer"),
                        stack.output("ConcourseLoadBalancerURL")
                    ),
                );
            }
            _ => return Err(CoreError::NoLbsFound),
        }

        Ok(())
    }
}
