/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a new identity
/// - `POST /v1/auth/login` - Exchange credentials for a session token
/// - `GET /v1/auth/me` - Profile of the authenticated caller
///
/// Register and login both answer with the same payload:
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "name": "Ann", "email": "ann@x.io", "username": "ann" }
/// }
/// ```
use crate::{app::AppState, error::ApiResult};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::identity::IdentityProfile,
    services::{AuthSession, RegisterInput},
};

/// Register request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,

    /// Optional when the caller arrives with an external principal
    pub password: Option<String>,

    /// Defaults to the local part of the email
    pub username: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address or username, case-insensitive
    pub email_or_username: String,
    pub password: String,
}

/// Register a new identity
///
/// A caller authenticated by the trusted gateway header gets its external
/// subject bound to the new identity.
///
/// # Errors
///
/// - `400 Bad Request`: Body is not JSON of the expected shape
/// - `409 Conflict`: Email, username or subject already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    auth: AuthContext,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let Json(req) = body?;

    let session = state
        .credentials
        .register(RegisterInput {
            name: req.name,
            email: req.email,
            password: req.password,
            username: req.username,
            external_subject: auth.external_subject().map(str::to_string),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Log in with email or username
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown identifier or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthSession>> {
    let Json(req) = body?;

    let session = state
        .credentials
        .authenticate(&req.email_or_username, &req.password)
        .await?;

    Ok(Json(session))
}

/// Profile of the caller
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<IdentityProfile>> {
    let identity = state.tasks.current_identity(&auth).await?;
    Ok(Json(identity.profile()))
}
