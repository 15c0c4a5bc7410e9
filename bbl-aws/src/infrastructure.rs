//! Stack lifecycle over CloudFormation
//!
//! Stack updates are synchronous: after submitting a template the manager
//! polls until CloudFormation reports a terminal status and surfaces the
//! status reason verbatim on failure.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bbl_core::CoreError;
use bbl_core::managers::InfrastructureManager;
use bbl_core::types::Stack;

use crate::templates::TemplateBuilder;

const POLL_DELAY: Duration = Duration::from_secs(5);
const MAX_POLL_ATTEMPTS: usize = 360;

pub struct CloudFormationManager {
    client: aws_sdk_cloudformation::Client,
    template_builder: TemplateBuilder,
}

impl CloudFormationManager {
    pub fn new(client: aws_sdk_cloudformation::Client) -> Self {
        Self {
            client,
            template_builder: TemplateBuilder::new(),
        }
    }

    async fn describe_raw(
        &self,
        stack_name: &str,
    ) -> Result<Option<aws_sdk_cloudformation::types::Stack>, CoreError> {
        let result = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await;

        match result {
            Ok(response) => Ok(response.stacks().first().cloned()),
            Err(e) => {
                let err_str = format!("{:?}", e);
                if err_str.contains("does not exist") {
                    Ok(None)
                } else {
                    Err(CoreError::Infrastructure(format!(
                        "failed to describe stack: {:?}",
                        e
                    )))
                }
            }
        }
    }

    /// Poll until the stack reaches a terminal status. Returns Ok(()) when
    /// the stack has converged or is gone (for deletes).
    async fn wait_for_stack(&self, stack_name: &str) -> Result<(), CoreError> {
        for _ in 0..MAX_POLL_ATTEMPTS {
            let stack = match self.describe_raw(stack_name).await? {
                Some(stack) => stack,
                None => return Ok(()),
            };

            let status = stack
                .stack_status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default();

            match status.as_str() {
                "CREATE_COMPLETE" | "UPDATE_COMPLETE" | "DELETE_COMPLETE" => return Ok(()),
                s if s.ends_with("_IN_PROGRESS") => {
                    tracing::debug!("stack {} is {}", stack_name, s);
                    tokio::time::sleep(POLL_DELAY).await;
                }
                s => {
                    let reason = stack.stack_status_reason().unwrap_or("no reason given");
                    return Err(CoreError::Infrastructure(format!(
                        "stack {} reached status {}: {}",
                        stack_name, s, reason
                    )));
                }
            }
        }

        Err(CoreError::Infrastructure(format!(
            "timed out waiting for stack {} to converge",
            stack_name
        )))
    }
}

#[async_trait]
impl InfrastructureManager for CloudFormationManager {
    async fn exists(&self, stack_name: &str) -> Result<bool, CoreError> {
        Ok(self.describe_raw(stack_name).await?.is_some())
    }

    async fn describe(&self, stack_name: &str) -> Result<Stack, CoreError> {
        let stack = self.describe_raw(stack_name).await?.ok_or_else(|| {
            CoreError::Infrastructure(format!("stack {} does not exist", stack_name))
        })?;

        let mut outputs = HashMap::new();
        for output in stack.outputs() {
            if let (Some(key), Some(value)) = (output.output_key(), output.output_value()) {
                outputs.insert(key.to_string(), value.to_string());
            }
        }

        Ok(Stack {
            name: stack_name.to_string(),
            outputs,
        })
    }

    async fn update(
        &self,
        key_pair_name: &str,
        availability_zone_count: usize,
        lb_type: &str,
        lb_certificate_arn: &str,
        stack_name: &str,
    ) -> Result<Stack, CoreError> {
        let template = self.template_builder.build(
            key_pair_name,
            availability_zone_count,
            lb_type,
            lb_certificate_arn,
        );
        let template_body = template.to_string();

        if self.describe_raw(stack_name).await?.is_some() {
            tracing::debug!("updating stack {}", stack_name);
            let result = self
                .client
                .update_stack()
                .stack_name(stack_name)
                .template_body(&template_body)
                .capabilities(aws_sdk_cloudformation::types::Capability::CapabilityIam)
                .send()
                .await;

            if let Err(e) = result {
                let err_str = format!("{:?}", e);
                // an identical template means there is nothing to converge
                if !err_str.contains("No updates are to be performed") {
                    return Err(CoreError::Infrastructure(format!(
                        "failed to update stack: {:?}",
                        e
                    )));
                }
            }
        } else {
            tracing::debug!("creating stack {}", stack_name);
            self.client
                .create_stack()
                .stack_name(stack_name)
                .template_body(&template_body)
                .capabilities(aws_sdk_cloudformation::types::Capability::CapabilityIam)
                .send()
                .await
                .map_err(|e| {
                    CoreError::Infrastructure(format!("failed to create stack: {:?}", e))
                })?;
        }

        self.wait_for_stack(stack_name).await?;
        self.describe(stack_name).await
    }

    async fn delete(&self, stack_name: &str) -> Result<(), CoreError> {
        tracing::debug!("deleting stack {}", stack_name);
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| CoreError::Infrastructure(format!("failed to delete stack: {:?}", e)))?;

        self.wait_for_stack(stack_name).await
    }
}
