use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::rbac::Role;
use crate::auth::repo_types::{Session, User};
use crate::auth::tokens::SessionKeys;
use crate::error::AppError;
use crate::state::AppState;

/// Request-scoped authentication context: who is calling and with which role.
/// Services take this explicitly instead of reading ambient state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Extracts the session token from the cookie (or a Bearer header), verifies
/// its signature and resolves it against the session store. Any failure is
/// `Unauthenticated`.
pub struct CurrentUser(pub RequestContext);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, &state.config.session.cookie_name)
            .ok_or(AppError::Unauthenticated)?;

        let keys = SessionKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid session token");
            AppError::Unauthenticated
        })?;

        // The row is the authority: a signed token for a deleted session is dead.
        let session = Session::find(&state.db, claims.sid)
            .await?
            .ok_or(AppError::Unauthenticated)?;
        let user = User::find_by_id(&state.db, session.user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;
        if !user.active {
            warn!(user_id = %user.id, "session for deactivated user");
            return Err(AppError::Unauthenticated);
        }

        Ok(CurrentUser(RequestContext {
            session_id: session.id,
            user_id: user.id,
            username: user.username,
            role: user.role,
        }))
    }
}

fn session_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    if let Some(cookies) = parts
        .headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
    {
        for pair in cookies.split(';') {
            if let Some(value) = pair
                .trim()
                .strip_prefix(cookie_name)
                .and_then(|rest| rest.strip_prefix('='))
            {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: &str, value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .header(header, value)
            .body(())
            .expect("request")
            .into_parts();
        parts
    }

    #[test]
    fn token_read_from_cookie() {
        let parts = parts_with("cookie", "theme=dark; tirestore_session=abc123");
        assert_eq!(
            session_token(&parts, "tirestore_session").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn token_read_from_bearer_header() {
        let parts = parts_with("authorization", "Bearer xyz");
        assert_eq!(session_token(&parts, "tirestore_session").as_deref(), Some("xyz"));
    }

    #[test]
    fn empty_cookie_is_ignored() {
        let parts = parts_with("cookie", "tirestore_session=");
        assert_eq!(session_token(&parts, "tirestore_session"), None);
    }
}
