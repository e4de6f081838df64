use anyhow::Context;
use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::auth::dto::{LoginRequest, PublicUser};
use crate::auth::extractors::CurrentUser;
use crate::auth::repo_types::User;
use crate::auth::services;
use crate::auth::tokens::SessionKeys;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/me", get(me))
}

/// Login form context. An already-authenticated user is sent straight to the
/// dashboard.
#[instrument(skip_all)]
pub async fn login_form(user: Option<CurrentUser>) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Json(json!({ "page": "login", "fields": ["username", "password"] })).into_response()
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let (session, user) = services::authenticate(&state.db, &payload.username, &payload.password)
        .await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(session.id, user.id, user.role)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&state.config, &token)
            .parse()
            .context("build session cookie")?,
    );
    Ok((headers, Redirect::to("/dashboard")).into_response())
}

/// Invalidate the session and clear the cookie. Safe to call without a live
/// session; logging out twice is not an error.
#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Result<Response, AppError> {
    if let Some(CurrentUser(ctx)) = user {
        services::logout(&state.db, ctx.session_id).await?;
        info!(user_id = %ctx.user_id, username = %ctx.username, "user logged out");
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        expired_cookie(&state.config)
            .parse()
            .context("build cookie")?,
    );
    Ok((headers, Redirect::to("/")).into_response())
}

/// The user behind the current session, for the presentation layer's
/// navigation chrome.
#[instrument(skip(state, ctx))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = User::find_by_id(&state.db, ctx.user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    Ok(Json(user.into()))
}

fn session_cookie(config: &AppConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Lax",
        config.session.cookie_name
    );
    if config.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

fn expired_cookie(config: &AppConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.session.cookie_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn session_cookie_is_http_only_and_scoped() {
        let state = AppState::fake();
        let cookie = session_cookie(&state.config, "tok");
        assert!(cookie.starts_with("tirestore_session=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"), "test env is not production");
    }

    #[test]
    fn expired_cookie_zeroes_max_age() {
        let state = AppState::fake();
        let cookie = expired_cookie(&state.config);
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn me_response_exposes_no_credentials() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            username: "admin".into(),
            email: "admin@tirestore.com".into(),
            password_hash: "secret-hash".into(),
            role: crate::auth::rbac::Role::Admin,
            active: true,
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("admin@tirestore.com"));
        assert!(json.contains("\"role\":\"admin\""));
        assert!(!json.contains("secret-hash"));
    }
}
