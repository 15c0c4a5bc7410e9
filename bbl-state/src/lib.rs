//! bbl State Management
//!
//! This crate provides the durable state document for bbl and its file
//! store. The state file (`bbl-state.json`) is the authoritative record of
//! everything bbl has created in the cloud: AWS credentials, the registered
//! key pair, the infrastructure stack, and the BOSH director.
//!
//! Writes are atomic (sibling temp file, then rename) so a partial write is
//! never observable. Unknown top-level keys round-trip untouched, which lets
//! state files move between bbl versions that share a schema version.

pub mod state;
pub mod store;

pub use state::{Aws, Bosh, KeyPair, Stack, State};
pub use store::{Store, StoreError, StoreResult};
