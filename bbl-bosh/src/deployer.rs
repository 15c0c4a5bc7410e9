//! The bosh-init deployer
//!
//! Turns a `DeployInput` into a manifest, converges the director through the
//! runner, and reports back the credentials and manifest to persist.
//! Credentials from a prior deploy are reused verbatim, which keeps a
//! drift-free re-run byte-identical.

use std::sync::Arc;

use async_trait::async_trait;
use bbl_core::managers::BoshDeployer;
use bbl_core::types::{DeployInput, DeployOutput};
use bbl_core::{CoreError, Logger};

use crate::manifest::{InternalCredentials, ManifestBuilder, ManifestProperties};
use crate::runner::BoshInitRunner;

pub struct BoshInitDeployer {
    manifest_builder: ManifestBuilder,
    runner: BoshInitRunner,
}

impl BoshInitDeployer {
    pub fn new(logger: Arc<dyn Logger>, runner: BoshInitRunner) -> Self {
        Self {
            manifest_builder: ManifestBuilder::new(logger),
            runner,
        }
    }

    fn ssl_key_pair(input: &DeployInput) -> Result<(String, String, String), CoreError> {
        if !input.ssl_certificate.is_empty() {
            return Ok((
                input.ssl_ca.clone(),
                input.ssl_certificate.clone(),
                input.ssl_private_key.clone(),
            ));
        }

        let mut params = rcgen::CertificateParams::default();
        let mut dn = rcgen::DistinguishedName::new();
        dn.push(rcgen::DnType::CommonName, "bosh-director");
        params.distinguished_name = dn;
        if let Ok(ip) = input.elastic_ip.parse() {
            params.subject_alt_names = vec![rcgen::SanType::IpAddress(ip)];
        }

        let certificate = rcgen::Certificate::from_params(params)
            .map_err(|e| CoreError::Bosh(format!("failed to generate director ssl: {}", e)))?;
        let certificate_pem = certificate
            .serialize_pem()
            .map_err(|e| CoreError::Bosh(format!("failed to serialize director ssl: {}", e)))?;
        let private_key_pem = certificate.serialize_private_key_pem();

        // self-signed, so the certificate doubles as its own authority
        Ok((certificate_pem.clone(), certificate_pem, private_key_pem))
    }
}

#[async_trait]
impl BoshDeployer for BoshInitDeployer {
    async fn deploy(&self, input: DeployInput) -> Result<DeployOutput, CoreError> {
        let director_username = non_empty_or(&input.director_username, "admin");
        let director_password = non_empty_or(&input.director_password, "admin");
        let (ssl_ca, ssl_certificate, ssl_private_key) = Self::ssl_key_pair(&input)?;
        let credentials = InternalCredentials::from_map(&input.credentials).or_defaults();

        let properties = ManifestProperties {
            subnet_id: input.subnet_id.clone(),
            availability_zone: input.availability_zone.clone(),
            elastic_ip: input.elastic_ip.clone(),
            access_key_id: input.iam_user_access_key.clone(),
            secret_access_key: input.iam_user_secret_key.clone(),
            default_key_name: input.key_pair_name.clone(),
            region: input.region.clone(),
            security_group: input.security_group.clone(),
            director_username: director_username.clone(),
            director_password: director_password.clone(),
            ssl_certificate: ssl_certificate.clone(),
            ssl_private_key: ssl_private_key.clone(),
            credentials: credentials.clone(),
        };

        let manifest = self.manifest_builder.build(&properties);
        let manifest_yaml = serde_yaml::to_string(&manifest)
            .map_err(|e| CoreError::Bosh(format!("failed to serialize manifest: {}", e)))?;

        self.runner.deploy(&manifest_yaml, &input.private_key).await?;

        Ok(DeployOutput {
            director_username,
            director_password,
            ssl_ca,
            ssl_certificate,
            ssl_private_key,
            credentials: credentials.to_map(),
            manifest: manifest_yaml,
        })
    }

    async fn delete(&self, manifest: &str, private_key: &str) -> Result<(), CoreError> {
        self.runner.delete(manifest, private_key).await
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
