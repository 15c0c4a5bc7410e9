//! Server certificate management over IAM

use std::path::Path;

use async_trait::async_trait;
use bbl_core::CoreError;
use bbl_core::managers::CertificateManager;
use bbl_core::types::Certificate;
use chrono::Utc;

pub struct IamCertificateManager {
    client: aws_sdk_iam::Client,
}

impl IamCertificateManager {
    pub fn new(client: aws_sdk_iam::Client) -> Self {
        Self { client }
    }

    /// Timestamped name, unique per upload. Identical content uploaded
    /// twice gets two distinct names.
    fn unique_name() -> String {
        format!("bbl-cert-{}", Utc::now().format("%Y%m%d%H%M%S%9f"))
    }

    async fn read(path: &Path) -> Result<String, CoreError> {
        tokio::fs::read_to_string(path).await.map_err(|e| {
            CoreError::Certificate(format!("failed to read {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl CertificateManager for IamCertificateManager {
    async fn create(
        &self,
        certificate_path: &Path,
        private_key_path: &Path,
        chain_path: Option<&Path>,
    ) -> Result<String, CoreError> {
        let certificate_body = Self::read(certificate_path).await?;
        let private_key = Self::read(private_key_path).await?;
        let chain = match chain_path {
            Some(path) => Some(Self::read(path).await?),
            None => None,
        };

        let name = Self::unique_name();
        tracing::debug!("uploading server certificate {}", name);

        self.client
            .upload_server_certificate()
            .server_certificate_name(&name)
            .certificate_body(certificate_body)
            .private_key(private_key)
            .set_certificate_chain(chain)
            .send()
            .await
            .map_err(|e| {
                CoreError::Certificate(format!("failed to upload certificate: {:?}", e))
            })?;

        Ok(name)
    }

    async fn describe(&self, certificate_name: &str) -> Result<Certificate, CoreError> {
        let response = self
            .client
            .get_server_certificate()
            .server_certificate_name(certificate_name)
            .send()
            .await
            .map_err(|e| {
                CoreError::Certificate(format!("failed to describe certificate: {:?}", e))
            })?;

        let arn = response
            .server_certificate()
            .map(|c| c.server_certificate_metadata().arn().to_string())
            .ok_or_else(|| {
                CoreError::Certificate(format!(
                    "certificate {} has no metadata",
                    certificate_name
                ))
            })?;

        Ok(Certificate {
            name: certificate_name.to_string(),
            arn,
        })
    }

    async fn delete(&self, certificate_name: &str) -> Result<(), CoreError> {
        let result = self
            .client
            .delete_server_certificate()
            .server_certificate_name(certificate_name)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err_str = format!("{:?}", e);
                // already gone counts as deleted
                if err_str.contains("NoSuchEntity") {
                    Ok(())
                } else {
                    Err(CoreError::Certificate(format!(
                        "failed to delete certificate: {:?}",
                        e
                    )))
                }
            }
        }
    }
}
