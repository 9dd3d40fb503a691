/// Request authentication for Axum
///
/// The middleware never rejects a request. It inspects the credentials,
/// resolves an [`AuthContext`] and stores it in the request extensions; each
/// service operation then decides whether a principal is required. Public
/// routes (register, login, health) therefore share the same stack as
/// protected ones.
///
/// # Credential sources
///
/// 1. `Authorization: Bearer <jwt>`: locally issued session token
/// 2. A trusted gateway header (for example `X-Auth-Subject`), only when
///    configured, carrying the subject of an externally verified identity
///
/// A present but invalid bearer token yields `Unauthenticated` even when the
/// gateway header is also set.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use taskdeck_shared::auth::middleware::{auth_context_middleware, AuthContext, AuthSettings};
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("{:?}", auth)
/// }
///
/// let settings = Arc::new(AuthSettings::new("secret-key-at-least-32-bytes-long", None));
/// let app: Router = Router::new()
///     .route("/whoami", get(handler))
///     .layer(middleware::from_fn_with_state(settings, auth_context_middleware));
/// ```
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// Who is calling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrincipalRef {
    /// Session token issued by this service
    Identity(Uuid),

    /// Subject verified by an external auth provider
    External { subject: String },
}

/// Authentication state of a request, passed into every service operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthContext {
    /// No usable credentials
    #[default]
    Unauthenticated,

    /// A principal was resolved
    Authenticated(PrincipalRef),
}

impl AuthContext {
    /// Context for a locally issued session
    pub fn identity(id: Uuid) -> Self {
        AuthContext::Authenticated(PrincipalRef::Identity(id))
    }

    /// Context for an externally verified subject
    pub fn external(subject: impl Into<String>) -> Self {
        AuthContext::Authenticated(PrincipalRef::External {
            subject: subject.into(),
        })
    }

    /// The principal, if any
    pub fn principal(&self) -> Option<&PrincipalRef> {
        match self {
            AuthContext::Unauthenticated => None,
            AuthContext::Authenticated(principal) => Some(principal),
        }
    }

    /// External subject, if the caller came through the gateway
    pub fn external_subject(&self) -> Option<&str> {
        match self.principal() {
            Some(PrincipalRef::External { subject }) => Some(subject),
            _ => None,
        }
    }
}

/// Settings the middleware needs to resolve credentials
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// HS256 secret for session tokens
    pub jwt_secret: String,

    /// Header carrying an externally verified subject; disabled when `None`
    pub subject_header: Option<String>,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>, subject_header: Option<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            subject_header,
        }
    }

    /// Resolves the auth context from request headers
    pub fn resolve(&self, headers: &HeaderMap) -> AuthContext {
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::trim);

            let Some(token) = token else {
                tracing::debug!("Ignoring non-bearer authorization header");
                return AuthContext::Unauthenticated;
            };

            return match validate_token(token, &self.jwt_secret) {
                Ok(claims) => AuthContext::identity(claims.sub),
                Err(JwtError::Expired) => {
                    tracing::debug!("Session token expired");
                    AuthContext::Unauthenticated
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected session token");
                    AuthContext::Unauthenticated
                }
            };
        }

        let subject = self
            .subject_header
            .as_deref()
            .and_then(|name| headers.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match subject {
            Some(subject) => AuthContext::external(subject),
            None => AuthContext::Unauthenticated,
        }
    }
}

/// Middleware that attaches an [`AuthContext`] to every request
pub async fn auth_context_middleware(
    State(settings): State<Arc<AuthSettings>>,
    mut req: Request,
    next: Next,
) -> Response {
    let context = settings.resolve(req.headers());
    req.extensions_mut().insert(context);

    next.run(req).await
}

/// Extracts the context set by [`auth_context_middleware`]
///
/// Falls back to `Unauthenticated` when the middleware is not installed.
#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}
