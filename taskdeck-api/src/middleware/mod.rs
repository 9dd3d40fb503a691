/// Middleware modules for the API server
///
/// - Security headers
///
/// Request authentication lives in `taskdeck_shared::auth::middleware`.

pub mod security;
