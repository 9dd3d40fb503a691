/// Identity model and registration input
///
/// An identity is a registered user. Email and username are stored trimmed
/// and lowercased so that uniqueness is case-insensitive. Passwords are
/// stored as Argon2id hashes; identities provisioned by an external auth
/// provider may carry no local password at all.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE identities (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(320) NOT NULL,
///     username VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255),
///     external_subject VARCHAR(255) UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX identities_email_key ON identities (LOWER(email));
/// CREATE UNIQUE INDEX identities_username_key ON identities (LOWER(username));
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Stored identity record
///
/// `password_hash` is never serialized; use [`IdentityProfile`] for anything
/// that leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Identity {
    /// Unique identity ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Lowercased email address
    pub email: String,

    /// Lowercased username
    pub username: String,

    /// Argon2id password hash, absent for externally provisioned identities
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// Subject id issued by an external auth provider
    pub external_subject: Option<String>,

    /// When the identity was registered
    pub created_at: DateTime<Utc>,

    /// When the identity was last updated
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Public view without credentials
    pub fn profile(&self) -> IdentityProfile {
        IdentityProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

/// Identity as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
}

/// Registration request
///
/// Build it with [`Registration::normalized`], which trims, lowercases and
/// derives the username before validation runs.
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Email address (lowercased)
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    /// Username (lowercased, defaults to the email local part)
    #[validate(length(min = 3, max = 255, message = "Username must be at least 3 characters"))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    /// Plaintext password, required unless `external_subject` is set
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,

    /// Subject id from an external auth provider
    pub external_subject: Option<String>,
}

impl Registration {
    /// Normalizes raw registration input
    ///
    /// # Example
    ///
    /// ```
    /// use taskdeck_shared::models::identity::Registration;
    ///
    /// let reg = Registration::normalized(" Ann ", " Ann@X.com ", Some("secret1"), None, None);
    /// assert_eq!(reg.email, "ann@x.com");
    /// assert_eq!(reg.username, "ann");
    /// assert_eq!(reg.name, "Ann");
    /// ```
    pub fn normalized(
        name: &str,
        email: &str,
        password: Option<&str>,
        username: Option<&str>,
        external_subject: Option<&str>,
    ) -> Self {
        let email = normalize_login(email);
        let username = username
            .map(normalize_login)
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| derive_username(&email));

        Self {
            name: name.trim().to_string(),
            email,
            username,
            password: password.map(str::to_string),
            external_subject: external_subject
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Validated identity ready to insert
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub external_subject: Option<String>,
}

/// Trims and lowercases an email or username for storage and lookup
pub fn normalize_login(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Username derived from the part of the email before `@`
pub fn derive_username(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

/// Usernames share the login lookup with emails, so they may not look like one
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.contains('@') {
        return Err(ValidationError::new("username_at_sign")
            .with_message("Username cannot contain @".into()));
    }
    Ok(())
}
