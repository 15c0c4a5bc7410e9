//! BOSH collaborators for bbl
//!
//! The manifest builder and cloud-config configurator are pure translators
//! from cloud facts into declarative documents; the deployer drives the
//! external bosh-init binary and the client talks to the director's HTTP
//! API.

pub mod client;
pub mod cloud_config;
pub mod deployer;
pub mod manifest;
pub mod runner;

pub use client::{BoshDirectorClient, BoshDirectorClientProvider};
pub use cloud_config::{BoshCloudConfigManager, BoshCloudConfigurator};
pub use deployer::BoshInitDeployer;
pub use manifest::{InternalCredentials, Manifest, ManifestBuilder, ManifestProperties};
pub use runner::BoshInitRunner;
