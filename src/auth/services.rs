use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::verify_password;
use crate::auth::repo_types::{Session, User};
use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Verify credentials and establish a session.
///
/// Unknown username, inactive account and wrong password all collapse into
/// the same `InvalidCredentials` error so a caller cannot probe which
/// accounts exist.
pub async fn authenticate(
    db: &PgPool,
    username: &str,
    password: &str,
) -> Result<(Session, User), AppError> {
    let username = username.trim();

    let user = match User::find_by_username(db, username).await? {
        Some(u) if u.active => u,
        _ => {
            warn!(username, "login rejected");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(username, user_id = %user.id, "login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let session = Session::create(db, user.id).await?;
    info!(
        user_id = %user.id,
        username = %user.username,
        role = user.role.as_str(),
        "user logged in"
    );
    Ok((session, user))
}

/// Invalidate a session. Idempotent.
pub async fn logout(db: &PgPool, session_id: Uuid) -> Result<(), AppError> {
    Session::delete(db, session_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("admin@tirestore.com"));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("admin@tirestore"));
        assert!(!is_valid_email("admin @tirestore.com"));
    }
}
