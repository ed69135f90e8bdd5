//! `AuthUser` extractor: turns the identity headers forwarded by the
//! upstream identity provider into a [`RequestContext`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use coursehub_core::error::AppError;
use coursehub_core::types::UserId;
use coursehub_service::context::RequestContext;

use crate::error::ApiError;

/// Header carrying the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let user_id: UserId = header(USER_ID_HEADER)
            .ok_or_else(|| AppError::authentication("Sign in to continue"))?
            .parse()
            .map_err(|_| AppError::authentication("Invalid user identity"))?;

        let email = header(USER_EMAIL_HEADER)
            .ok_or_else(|| AppError::authentication("Missing user email"))?
            .to_string();

        Ok(AuthUser(RequestContext::new(user_id, email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use coursehub_core::error::ErrorKind;

    async fn extract(builder: axum::http::request::Builder) -> Result<AuthUser, ApiError> {
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_identity_headers() {
        let id = UserId::new();
        let auth = extract(
            Request::builder()
                .header(USER_ID_HEADER, id.to_string())
                .header(USER_EMAIL_HEADER, " ada@example.com "),
        )
        .await
        .unwrap();
        assert_eq!(auth.user_id, id);
        assert_eq!(auth.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_missing_or_malformed_identity_is_unauthenticated() {
        let err = extract(Request::builder()).await.unwrap_err();
        assert_eq!(err.0.kind, ErrorKind::Authentication);

        let err = extract(
            Request::builder()
                .header(USER_ID_HEADER, "not-a-uuid")
                .header(USER_EMAIL_HEADER, "ada@example.com"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0.kind, ErrorKind::Authentication);

        let err = extract(Request::builder().header(USER_ID_HEADER, UserId::new().to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.0.kind, ErrorKind::Authentication);
    }
}
