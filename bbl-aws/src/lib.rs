//! AWS collaborators for bbl
//!
//! Implements the command engine's cloud-facing traits on top of the AWS
//! SDK: CloudFormation for the stack, IAM for server certificates, EC2 for
//! availability zones and key pairs.

pub mod availability_zones;
pub mod certificates;
pub mod certs;
pub mod client;
pub mod credentials;
pub mod infrastructure;
pub mod key_pairs;
pub mod templates;

pub use availability_zones::Ec2AvailabilityZoneRetriever;
pub use certificates::IamCertificateManager;
pub use certs::PemCertificateValidator;
pub use client::AwsClients;
pub use credentials::AwsCredentialValidator;
pub use infrastructure::CloudFormationManager;
pub use key_pairs::{Ec2KeyPairDeleter, Ec2KeyPairSynchronizer};
pub use templates::TemplateBuilder;
