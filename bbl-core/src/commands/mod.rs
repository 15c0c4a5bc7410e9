//! The bbl commands
//!
//! Each command is a struct holding its collaborators, with an async
//! `execute` that takes the incoming state and returns the resulting state.
//! Best-effort partial state travels inside [`ExecuteError`] on failure.

use std::io::Write;
use std::sync::{Arc, Mutex};

mod create_lbs;
mod delete_lbs;
mod destroy;
mod lbs;
mod state_query;
mod up;
mod update_lbs;
mod version;

#[cfg(test)]
pub(crate) mod fakes;

pub use create_lbs::{CreateLbs, CreateLbsArgs};
pub use delete_lbs::DeleteLbs;
pub use destroy::{Destroy, DestroyArgs};
pub use lbs::Lbs;
pub use state_query::{StateProperty, StateQuery};
pub use up::Up;
pub use update_lbs::{UpdateLbs, UpdateLbsArgs};
pub use version::Version;

/// Shared handle to the process stdout (or a buffer under test)
pub type Stdout = Arc<Mutex<dyn Write + Send>>;

pub(crate) fn write_line(stdout: &Stdout, line: &str) {
    if let Ok(mut out) = stdout.lock() {
        let _ = writeln!(out, "{}", line);
    }
}
