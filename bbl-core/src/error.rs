//! Error types for the command engine

use bbl_state::State;
use thiserror::Error;

/// Errors surfaced by commands and their collaborators.
///
/// Collaborator failures are wrapped in message-preserving variants so the
/// cloud's diagnostics reach the operator verbatim.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("bbl environment was not found, please create the environment first by running: bbl up")]
    EnvironmentNotFound,

    #[error("\"{0}\" is not a valid lb type, valid lb types are: concourse and cf")]
    InvalidLbType(String),

    #[error("bbl already has a {0} load balancer attached, please remove the previous load balancer before attaching a new one")]
    LbAlreadyAttached(String),

    #[error("no lbs found")]
    NoLbsFound,

    #[error("{0}")]
    Credentials(String),

    #[error("{0}")]
    CertificateValidation(String),

    #[error("{0}")]
    Certificate(String),

    #[error("{0}")]
    Infrastructure(String),

    #[error("{0}")]
    AvailabilityZones(String),

    #[error("{0}")]
    KeyPair(String),

    #[error("{0}")]
    Bosh(String),

    #[error("{0}")]
    CloudConfig(String),
}

/// A command failure carrying the best-effort updated state.
///
/// Partial progress (a certificate already uploaded, a key pair already
/// synchronized) must not be lost, so the dispatcher persists this state
/// before exiting nonzero.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ExecuteError {
    pub state: Box<State>,
    #[source]
    pub source: CoreError,
}

impl ExecuteError {
    pub fn new(state: State, source: CoreError) -> Self {
        Self {
            state: Box::new(state),
            source,
        }
    }
}

/// Result of a command execution
pub type ExecuteResult = Result<State, ExecuteError>;
