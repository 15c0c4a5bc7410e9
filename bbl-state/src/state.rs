//! The persisted state document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The authoritative state document that persists to `bbl-state.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// State file schema version
    pub version: u64,
    /// AWS credentials and target region
    #[serde(default)]
    pub aws: Aws,
    /// The SSH key pair registered with EC2
    #[serde(default)]
    pub key_pair: KeyPair,
    /// The infrastructure stack tracked by bbl
    #[serde(default)]
    pub stack: Stack,
    /// The deployed BOSH director
    #[serde(default)]
    pub bosh: Bosh,
    /// Keys written by other bbl versions, preserved on round-trip
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl State {
    /// Current state file schema version
    pub const CURRENT_VERSION: u64 = 3;

    /// Create a new empty state at the current schema version
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Self::default()
        }
    }

    /// True when this state records no cloud-side resources
    pub fn is_empty(&self) -> bool {
        self.key_pair == KeyPair::default()
            && self.stack == Stack::default()
            && self.bosh == Bosh::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aws {
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyPair {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: String,
}

/// The cloud stack as bbl tracks it. `lb_type` is one of `""`, `"none"`,
/// `"cf"`, `"concourse"`; `certificate_name` is non-empty exactly when a
/// load balancer is attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lb_type: String,
    #[serde(default)]
    pub certificate_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bosh {
    #[serde(default)]
    pub director_address: String,
    #[serde(default)]
    pub director_username: String,
    #[serde(default)]
    pub director_password: String,
    #[serde(default)]
    pub director_ssl_ca: String,
    #[serde(default)]
    pub director_ssl_certificate: String,
    #[serde(default)]
    pub director_ssl_private_key: String,
    /// Internal credentials generated for the director deployment
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
    /// The bosh-init manifest from the last successful deploy
    #[serde(default)]
    pub manifest: String,
}
