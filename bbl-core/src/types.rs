//! Shared value types passed between commands and collaborators

use std::collections::{BTreeMap, HashMap};

use crate::error::CoreError;

/// A cloud stack as described by the infrastructure manager. Not persisted;
/// the stack's outputs carry the facts other collaborators need
/// (`BOSHSubnet`, `BOSHEIP`, load balancer names and URLs, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    pub name: String,
    pub outputs: HashMap<String, String>,
}

impl Stack {
    /// Output value by name, empty when the template did not emit it
    pub fn output(&self, name: &str) -> &str {
        self.outputs.get(name).map(String::as_str).unwrap_or("")
    }
}

/// A TLS certificate registered with the cloud
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Certificate {
    pub name: String,
    pub arn: String,
}

/// The closed set of load balancer variants bbl can attach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LbType {
    Cf,
    Concourse,
}

impl LbType {
    /// Parse a user-supplied `--type` value
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "cf" => Ok(Self::Cf),
            "concourse" => Ok(Self::Concourse),
            _ => Err(CoreError::InvalidLbType(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cf => "cf",
            Self::Concourse => "concourse",
        }
    }
}

/// True when a state's `lb_type` field records an attached load balancer
/// (the sentinels `""` and `"none"` do not)
pub fn lb_attached(lb_type: &str) -> bool {
    matches!(lb_type, "cf" | "concourse")
}

/// Carrier between the cloud-config configurator and manager
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudConfigInput {
    /// Availability zone names, in retrieval order
    pub azs: Vec<String>,
    /// Attached lb variant, `""`/`"none"` when none
    pub lb_type: String,
    /// Load balancer names for the lb vm_extension
    pub lbs: Vec<String>,
}

/// Facts the bosh-init deployer needs to converge the director
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployInput {
    pub iam_user_access_key: String,
    pub iam_user_secret_key: String,
    pub region: String,
    pub subnet_id: String,
    pub availability_zone: String,
    pub elastic_ip: String,
    pub security_group: String,
    pub key_pair_name: String,
    pub private_key: String,
    /// Director credentials from a prior deploy, empty on first run
    pub director_username: String,
    pub director_password: String,
    /// Director SSL key pair from a prior deploy, empty on first run
    pub ssl_ca: String,
    pub ssl_certificate: String,
    pub ssl_private_key: String,
    /// Internal credentials from a prior deploy, empty on first run
    pub credentials: BTreeMap<String, String>,
    /// The prior manifest; persistent disk and credential fields are
    /// carried forward when present
    pub manifest: String,
}

/// What a successful bosh-init converge produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployOutput {
    pub director_username: String,
    pub director_password: String,
    pub ssl_ca: String,
    pub ssl_certificate: String,
    pub ssl_private_key: String,
    pub credentials: BTreeMap<String, String>,
    pub manifest: String,
}

/// BOSH director identity returned by the info endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoshInfo {
    pub name: String,
    pub uuid: String,
    pub version: String,
}
