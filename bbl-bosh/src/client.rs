//! BOSH director HTTP client

use std::sync::Arc;

use async_trait::async_trait;
use bbl_core::CoreError;
use bbl_core::managers::{BoshClient, BoshClientProvider};
use bbl_core::types::BoshInfo;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct InfoResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
struct DeploymentResponse {
    name: String,
}

pub struct BoshDirectorClient {
    address: String,
    username: String,
    password: String,
    http: reqwest::Client,
}

impl BoshDirectorClient {
    pub fn new(address: &str, username: &str, password: &str) -> Self {
        // the director serves a self-signed certificate
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            address: address.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

#[async_trait]
impl BoshClient for BoshDirectorClient {
    async fn info(&self) -> Result<BoshInfo, CoreError> {
        let response = self
            .http
            .get(self.url("/info"))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| CoreError::Bosh(format!("failed to reach director: {}", e)))?;

        if !response.status().is_success() {
            return Err(CoreError::Bosh(format!(
                "director info returned {}",
                response.status()
            )));
        }

        let info: InfoResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Bosh(format!("failed to parse director info: {}", e)))?;

        Ok(BoshInfo {
            name: info.name,
            uuid: info.uuid,
            version: info.version,
        })
    }

    async fn update_cloud_config(&self, cloud_config_yaml: &str) -> Result<(), CoreError> {
        tracing::debug!("uploading cloud config to {}", self.address);
        let response = self
            .http
            .post(self.url("/cloud_configs"))
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/yaml")
            .body(cloud_config_yaml.to_string())
            .send()
            .await
            .map_err(|e| CoreError::Bosh(format!("failed to upload cloud config: {}", e)))?;

        if !response.status().is_success() {
            return Err(CoreError::Bosh(format!(
                "cloud config update returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn deployments(&self) -> Result<Vec<String>, CoreError> {
        let response = self
            .http
            .get(self.url("/deployments"))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| CoreError::Bosh(format!("failed to list deployments: {}", e)))?;

        if !response.status().is_success() {
            return Err(CoreError::Bosh(format!(
                "deployments listing returned {}",
                response.status()
            )));
        }

        let deployments: Vec<DeploymentResponse> = response
            .json()
            .await
            .map_err(|e| CoreError::Bosh(format!("failed to parse deployments: {}", e)))?;

        Ok(deployments.into_iter().map(|d| d.name).collect())
    }

    async fn delete_deployment(&self, name: &str) -> Result<(), CoreError> {
        tracing::debug!("deleting deployment {}", name);
        let response = self
            .http
            .delete(self.url(&format!("/deployments/{}?force=true", name)))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| CoreError::Bosh(format!("failed to delete deployment {}: {}", name, e)))?;

        // the director answers with a redirect to the tracking task
        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(CoreError::Bosh(format!(
                "deployment deletion returned {}",
                status
            )));
        }

        Ok(())
    }
}

/// Builds a director client per `(address, username, password)` triple
#[derive(Default)]
pub struct BoshDirectorClientProvider;

impl BoshDirectorClientProvider {
    pub fn new() -> Self {
        Self
    }
}

impl BoshClientProvider for BoshDirectorClientProvider {
    fn client(
        &self,
        director_address: &str,
        director_username: &str,
        director_password: &str,
    ) -> Arc<dyn BoshClient> {
        Arc::new(BoshDirectorClient::new(
            director_address,
            director_username,
            director_password,
        ))
    }
}
