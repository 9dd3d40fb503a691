/// Service error to GraphQL error conversion
///
/// Every error carries `extensions.code`:
///
/// | ServiceError | code |
/// |---|---|
/// | Validation | `BAD_USER_INPUT` (plus `extensions.fields`) |
/// | Conflict | `CONFLICT` |
/// | AuthenticationRequired, AuthenticationFailed | `UNAUTHENTICATED` |
/// | NotFound | `NOT_FOUND` |
/// | Internal | `INTERNAL_SERVER_ERROR` (message withheld) |
///
/// `async_graphql::Error` converts from anything `Display`, so a bare `?`
/// on a `ServiceResult` would compile but drop the code. Resolvers go
/// through [`IntoGraphql`] instead.
use async_graphql::{Error, ErrorExtensions};
use taskdeck_shared::error::{ServiceError, ServiceResult};

pub fn code(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::Validation(_) => "BAD_USER_INPUT",
        ServiceError::Conflict(_) => "CONFLICT",
        ServiceError::AuthenticationRequired | ServiceError::AuthenticationFailed => {
            "UNAUTHENTICATED"
        }
        ServiceError::NotFound(_) => "NOT_FOUND",
        ServiceError::Internal(_) => "INTERNAL_SERVER_ERROR",
    }
}

pub fn to_graphql_error(err: ServiceError) -> Error {
    let code = code(&err);

    let message = match &err {
        ServiceError::Validation(fields) if fields.len() == 1 => fields[0].message.clone(),
        ServiceError::Conflict(msg) | ServiceError::NotFound(msg) => msg.clone(),
        ServiceError::Internal(msg) => {
            tracing::error!("Internal error: {}", msg);
            "An internal error occurred".to_string()
        }
        other => other.to_string(),
    };

    let fields = match &err {
        ServiceError::Validation(fields) => async_graphql::to_value(fields).ok(),
        _ => None,
    };

    Error::new(message).extend_with(|_, extensions| {
        extensions.set("code", code);
        if let Some(fields) = fields {
            extensions.set("fields", fields);
        }
    })
}

/// Converts service results for resolvers
pub trait IntoGraphql<T> {
    fn into_graphql(self) -> async_graphql::Result<T>;
}

impl<T> IntoGraphql<T> for ServiceResult<T> {
    fn into_graphql(self) -> async_graphql::Result<T> {
        self.map_err(to_graphql_error)
    }
}
