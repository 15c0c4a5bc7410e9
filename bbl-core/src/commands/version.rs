use bbl_state::State;

use crate::commands::{Stdout, write_line};
use crate::error::ExecuteResult;

/// Prints the bbl version banner
pub struct Version {
    stdout: Stdout,
}

impl Version {
    pub fn new(stdout: Stdout) -> Self {
        Self { stdout }
    }

    pub async fn execute(&self, state: State) -> ExecuteResult {
        write_line(&self.stdout, concat!("bbl ", env!("CARGO_PKG_VERSION")));
        Ok(state)
    }
}
