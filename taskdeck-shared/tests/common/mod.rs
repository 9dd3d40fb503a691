//! Shared fixtures for service-level tests
//!
//! Services are wired to the in-memory stores, so these tests need no
//! database.
#![allow(dead_code)]

use chrono::Duration;
use std::sync::Arc;
use taskdeck_shared::auth::middleware::AuthContext;
use taskdeck_shared::services::{CredentialService, RegisterInput, TaskService};
use taskdeck_shared::store::memory::{MemoryIdentityStore, MemoryTaskStore};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

pub struct TestContext {
    pub credentials: CredentialService,
    pub tasks: TaskService,
}

impl TestContext {
    pub fn new() -> Self {
        let identities = Arc::new(MemoryIdentityStore::new());
        let tasks = Arc::new(MemoryTaskStore::new());

        Self {
            credentials: CredentialService::new(identities.clone(), TEST_SECRET, Duration::days(7)),
            tasks: TaskService::new(identities, tasks),
        }
    }

    /// Registers an identity and returns a session context for it
    pub async fn sign_up(&self, name: &str, email: &str) -> AuthContext {
        let session = self
            .credentials
            .register(RegisterInput {
                name: name.to_string(),
                email: email.to_string(),
                password: Some("secret1".to_string()),
                ..Default::default()
            })
            .await
            .expect("registration should succeed");

        AuthContext::identity(session.user.id)
    }
}

pub fn register_input(name: &str, email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        name: name.to_string(),
        email: email.to_string(),
        password: Some(password.to_string()),
        ..Default::default()
    }
}
