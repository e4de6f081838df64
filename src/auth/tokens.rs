use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::auth::rbac::Role;
use crate::state::AppState;

/// Payload of the signed session token carried in the cookie.
///
/// There is no `exp` claim: the browser's session cookie and the server-held
/// session row bound the lifetime, not the token itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,  // user ID
    pub sid: Uuid,  // session row ID
    pub role: Role, // role at login time
    pub iat: usize, // issued at (unix timestamp)
    pub iss: String,
}

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.session.secret, &state.config.session.issuer)
    }
}

impl SessionKeys {
    pub fn new(secret: &str, issuer: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
        }
    }

    pub fn sign(&self, session_id: Uuid, user_id: Uuid, role: Role) -> anyhow::Result<String> {
        let claims = SessionClaims {
            sub: user_id,
            sid: session_id,
            role,
            iat: OffsetDateTime::now_utc().unix_timestamp() as usize,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, session_id = %session_id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> SessionKeys {
        SessionKeys::new("test-secret", "test-issuer")
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let token = keys.sign(session_id, user_id, Role::Sales).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.sid, session_id);
        assert_eq!(claims.role, Role::Sales);
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = make_keys()
            .sign(Uuid::new_v4(), Uuid::new_v4(), Role::Admin)
            .expect("sign");
        let other = SessionKeys::new("another-secret", "test-issuer");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer() {
        let token = make_keys()
            .sign(Uuid::new_v4(), Uuid::new_v4(), Role::Admin)
            .expect("sign");
        let other = SessionKeys::new("test-secret", "someone-else");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let mut token = keys
            .sign(Uuid::new_v4(), Uuid::new_v4(), Role::Accounting)
            .expect("sign");
        token.pop();
        token.push('A');
        assert!(keys.verify(&token).is_err());
    }
}
