use bbl_state::State;

use crate::commands::{Stdout, write_line};
use crate::error::{CoreError, ExecuteError, ExecuteResult};

/// Which state field an info command reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateProperty {
    DirectorAddress,
    DirectorUsername,
    DirectorPassword,
    SshKey,
}

impl StateProperty {
    fn fetch<'a>(self, state: &'a State) -> &'a str {
        match self {
            Self::DirectorAddress => &state.bosh.director_address,
            Self::DirectorUsername => &state.bosh.director_username,
            Self::DirectorPassword => &state.bosh.director_password,
            Self::SshKey => &state.key_pair.private_key,
        }
    }
}

/// Prints a single field of the state (`director-address`, `ssh-key`, ...)
pub struct StateQuery {
    stdout: Stdout,
    property: StateProperty,
}

impl StateQuery {
    pub fn new(stdout: Stdout, property: StateProperty) -> Self {
        Self { stdout, property }
    }

    pub async fn execute(&self, state: State) -> ExecuteResult {
        let value = self.property.fetch(&state);
        if value.is_empty() {
            return Err(ExecuteError::new(state, CoreError::EnvironmentNotFound));
        }

        write_line(&self.stdout, value);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fakes::SharedBuffer;
    use std::sync::{Arc, Mutex};

    fn command(property: StateProperty) -> (SharedBuffer, StateQuery) {
        let buffer = SharedBuffer::default();
        let query = StateQuery::new(Arc::new(Mutex::new(buffer.clone())), property);
        (buffer, query)
    }

    #[tokio::test]
    async fn prints_the_director_address() {
        let (buffer, query) = command(StateProperty::DirectorAddress);
        let mut state = State::new();
        state.bosh.director_address = "https://192.0.2.10:25555".to_string();

        query.execute(state).await.unwrap();

        assert_eq!(buffer.contents(), "https://192.0.2.10:25555\n");
    }

    #[tokio::test]
    async fn prints_the_ssh_private_key() {
        let (buffer, query) = command(StateProperty::SshKey);
        let mut state = State::new();
        state.key_pair.private_key = "some-private-key".to_string();

        query.execute(state).await.unwrap();

        assert_eq!(buffer.contents(), "some-private-key\n");
    }

    #[tokio::test]
    async fn errors_when_the_field_is_empty() {
        let (_, query) = command(StateProperty::DirectorPassword);

        let err = query.execute(State::new()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "bbl environment was not found, please create the environment first by running: bbl up"
        );
    }
}
