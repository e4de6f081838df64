use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::rbac::Role;
use crate::auth::repo_types::User;

/// Credentials submitted by the login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public part of the user handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
        }
    }
}
