//! Scripted IdentityProvider
//!
//! Answers every call with the same profile or the same upstream status and
//! records what it was asked.

use async_trait::async_trait;
use grpc_clients::{IdentityError, IdentityProvider, User};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tonic::Status;

#[derive(Clone)]
pub struct MockIdentity {
    outcome: Result<User, Status>,
    /// (token, deadline) of every call, in order
    calls: Arc<Mutex<Vec<(String, Option<Duration>)>>>,
}

impl MockIdentity {
    pub fn returning(username: &str) -> Self {
        Self {
            outcome: Ok(User {
                id: 7,
                name: format!("{username} (test)"),
                username: username.to_string(),
                email: format!("{username}@example.ac.id"),
                role_id: 8,
            }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(status: Status) -> Self {
        Self {
            outcome: Err(status),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, Option<Duration>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn current_user(
        &self,
        token: &str,
        deadline: Option<Duration>,
    ) -> Result<User, IdentityError> {
        self.calls
            .lock()
            .unwrap()
            .push((token.to_string(), deadline));

        self.outcome.clone().map_err(IdentityError::Upstream)
    }
}
