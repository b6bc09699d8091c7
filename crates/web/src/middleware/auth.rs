//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in user, optionally with a
//! given role, in route handlers. Roles come from the snapshot stored in the
//! session at sign-in.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use product_catalog_core::RoleName;

use crate::models::{CurrentUser, session_keys};

/// Login page unauthenticated requests are sent to.
pub const LOGIN_PATH: &str = "/account/login";

/// Error returned when a request lacks the required authentication.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// No session layer is installed.
    Unauthorized,
    /// Signed in, but without the required role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

async fn current_user(parts: &Parts) -> Result<CurrentUser, AuthRejection> {
    // Get the session from extensions (set by SessionManagerLayer)
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::RedirectToLogin)
}

async fn current_user_with_role(
    parts: &Parts,
    role: RoleName,
) -> Result<CurrentUser, AuthRejection> {
    let user = current_user(parts).await?;
    if !user.has_role(role) {
        tracing::warn!(account_id = %user.id, required = %role, "Access denied");
        return Err(AuthRejection::Forbidden);
    }
    Ok(user)
}

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).await.map(Self)
    }
}

/// Extractor that requires the `Admin` role.
///
/// Redirects to login when signed out and returns 403 Forbidden when the
/// user lacks the role.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user_with_role(parts, RoleName::Admin).await.map(Self)
    }
}

/// Extractor that requires the `SuperAdmin` role.
///
/// # Example
///
/// ```rust,ignore
/// async fn super_admin_handler(
///     RequireSuperAdmin(admin): RequireSuperAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello super admin {}!", admin.email)
/// }
/// ```
pub struct RequireSuperAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user_with_role(parts, RoleName::SuperAdmin)
            .await
            .map(Self)
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await.ok()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use product_catalog_core::{AccountId, Email};

    use super::*;

    async fn parts_with(user: Option<CurrentUser>) -> Parts {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        if let Some(user) = user {
            session
                .insert(session_keys::CURRENT_USER, &user)
                .await
                .unwrap();
        }
        let (mut parts, ()) = Request::builder()
            .uri("/products")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(session);
        parts
    }

    fn user(roles: Vec<RoleName>) -> CurrentUser {
        CurrentUser {
            id: AccountId::generate(),
            email: Email::parse("u@x.com").unwrap(),
            roles,
        }
    }

    #[tokio::test]
    async fn test_require_auth_redirects_when_signed_out() {
        let mut parts = parts_with(None).await;
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::RedirectToLogin));
    }

    #[tokio::test]
    async fn test_require_admin_forbids_plain_user() {
        let mut parts = parts_with(Some(user(vec![RoleName::User]))).await;
        let rejection = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::Forbidden));
    }

    #[tokio::test]
    async fn test_require_super_admin_accepts_role() {
        let mut parts = parts_with(Some(user(vec![RoleName::SuperAdmin]))).await;
        assert!(
            RequireSuperAdmin::from_request_parts(&mut parts, &())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_unauthorized() {
        let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::Unauthorized));
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
