/// Credential store: registration and password authentication
///
/// Both operations return an [`AuthSession`] carrying a freshly signed
/// session token and the public profile of the identity.
///
/// Password hashing and verification run on the blocking thread pool;
/// Argon2id with 64 MB of memory would otherwise stall an async worker.
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::jwt::{create_token, Claims};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{ServiceError, ServiceResult};
use crate::models::identity::{normalize_login, Identity, IdentityProfile, NewIdentity, Registration};
use crate::store::IdentityStore;

/// Message for every duplicate registration
pub const DUPLICATE_IDENTITY: &str = "User already exists with this email or username";

/// Token plus the identity it was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: IdentityProfile,
}

/// Raw registration input as received from a client
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub username: Option<String>,

    /// Set only from a verified external principal, never from request bodies
    pub external_subject: Option<String>,
}

/// Registers identities and verifies passwords
#[derive(Clone)]
pub struct CredentialService {
    identities: Arc<dyn IdentityStore>,
    jwt_secret: Arc<str>,
    token_ttl: Duration,
}

impl CredentialService {
    pub fn new(identities: Arc<dyn IdentityStore>, jwt_secret: &str, token_ttl: Duration) -> Self {
        Self {
            identities,
            jwt_secret: Arc::from(jwt_secret),
            token_ttl,
        }
    }

    /// Registers a new identity
    ///
    /// # Errors
    ///
    /// - `Validation`: bad email shape, username shorter than 3, password
    ///   shorter than 6, or no password without an external subject
    /// - `Conflict`: email, username or external subject already taken
    pub async fn register(&self, input: RegisterInput) -> ServiceResult<AuthSession> {
        let registration = Registration::normalized(
            &input.name,
            &input.email,
            input.password.as_deref(),
            input.username.as_deref(),
            input.external_subject.as_deref(),
        );
        registration.validate()?;

        if registration.password.is_none() && registration.external_subject.is_none() {
            return Err(ServiceError::invalid("password", "Password is required"));
        }

        let taken = self
            .identities
            .exists(
                &registration.email,
                &registration.username,
                registration.external_subject.as_deref(),
            )
            .await?;
        if taken {
            warn!(email = %registration.email, "Registration rejected: identity exists");
            return Err(ServiceError::Conflict(DUPLICATE_IDENTITY.to_string()));
        }

        let password_hash = match registration.password {
            Some(password) => Some(hash_blocking(password).await?),
            None => None,
        };

        let identity = self
            .identities
            .insert(NewIdentity {
                name: registration.name,
                email: registration.email,
                username: registration.username,
                password_hash,
                external_subject: registration.external_subject,
            })
            .await
            .map_err(|e| match ServiceError::from(e) {
                // Lost a race with a concurrent registration
                ServiceError::Conflict(_) => ServiceError::Conflict(DUPLICATE_IDENTITY.to_string()),
                other => other,
            })?;

        info!(identity_id = %identity.id, username = %identity.username, "Identity registered");
        self.session_for(&identity)
    }

    /// Verifies a password for the identity matching `identifier`
    ///
    /// `identifier` is matched case-insensitively against email or
    /// username. Unknown identifier, identity without a local password and
    /// wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> ServiceResult<AuthSession> {
        let login = normalize_login(identifier);
        if login.is_empty() {
            return Err(ServiceError::AuthenticationFailed);
        }

        let Some(identity) = self.identities.find_by_login(&login).await? else {
            warn!("Login failed: unknown identifier");
            return Err(ServiceError::AuthenticationFailed);
        };

        let Some(hash) = identity.password_hash.clone() else {
            warn!(identity_id = %identity.id, "Login failed: no local password");
            return Err(ServiceError::AuthenticationFailed);
        };

        if !verify_blocking(password.to_string(), hash).await? {
            warn!(identity_id = %identity.id, "Login failed: wrong password");
            return Err(ServiceError::AuthenticationFailed);
        }

        info!(identity_id = %identity.id, "Identity authenticated");
        self.session_for(&identity)
    }

    /// Signs a session token for `identity`
    pub fn session_for(&self, identity: &Identity) -> ServiceResult<AuthSession> {
        let claims = Claims::with_expiration(
            identity.id,
            &identity.email,
            &identity.username,
            self.token_ttl,
        );
        let token = create_token(&claims, &self.jwt_secret)?;

        Ok(AuthSession {
            token,
            user: identity.profile(),
        })
    }
}

async fn hash_blocking(password: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(ServiceError::from)
}

async fn verify_blocking(password: String, hash: String) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_token;
    use crate::store::memory::MemoryIdentityStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> CredentialService {
        CredentialService::new(Arc::new(MemoryIdentityStore::new()), SECRET, Duration::days(7))
    }

    fn input(name: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            name: name.to_string(),
            email: email.to_string(),
            password: Some(password.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_session_token_identifies_user() {
        let service = service();
        let session = service.register(input("Ann", "ann@x.com", "secret1")).await.unwrap();

        let claims = validate_token(&session.token, SECRET).unwrap();
        assert_eq!(claims.sub, session.user.id);
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.username, "ann");
    }

    #[tokio::test]
    async fn test_password_required_without_external_subject() {
        let service = service();
        let mut data = input("Ann", "ann@x.com", "x");
        data.password = None;

        let err = service.register(data).await.unwrap_err();
        assert_eq!(err, ServiceError::invalid("password", "Password is required"));
    }

    #[tokio::test]
    async fn test_external_identity_cannot_password_login() {
        let service = service();
        let mut data = input("Ext", "ext@x.com", "x");
        data.password = None;
        data.external_subject = Some("auth0|1".to_string());
        service.register(data).await.unwrap();

        let err = service.authenticate("ext@x.com", "").await.unwrap_err();
        assert_eq!(err, ServiceError::AuthenticationFailed);
    }
}
