//! Per-caller session state and the signed token that carries it between requests.
//!
//! The server keeps no session table. Each response that changes the session
//! hands back a fresh HS256 token holding the whole [`Session`]; the client
//! returns it in the `session` cookie or as a bearer token.

use actix_web::cookie::Cookie;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::StoreError;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Product ids in the cart, no duplicates.
    #[serde(default)]
    pub cart: Vec<i64>,
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    session: Session,
    exp: usize, // Expiration time as UTC timestamp
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: chrono::Duration) -> Self {
        SessionKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, chrono::Duration::hours(config.session_ttl_hours))
    }

    pub fn issue(&self, session: &Session) -> Result<String, StoreError> {
        let exp = (chrono::Utc::now() + self.ttl).timestamp().max(0) as usize;
        let claims = Claims {
            session: session.clone(),
            exp,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// `None` for anything that is not a live token signed with our secret.
    pub fn verify(&self, token: &str) -> Option<Session> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims.session)
            .ok()
    }

    pub fn cookie(&self, session: &Session) -> Result<Cookie<'static>, StoreError> {
        Ok(session_cookie(self.issue(session)?))
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token).path("/").http_only(true).finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new("test-secret", chrono::Duration::hours(1))
    }

    #[test]
    fn issued_token_verifies_to_same_session() {
        let session = Session {
            cart: vec![3, 1],
            logged_in: true,
            username: Some("alice".into()),
        };
        let token = keys().issue(&session).unwrap();
        assert_eq!(keys().verify(&token), Some(session));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = SessionKeys::new("other-secret", chrono::Duration::hours(1));
        let token = other.issue(&Session::default()).unwrap();
        assert_eq!(keys().verify(&token), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let stale = SessionKeys::new("test-secret", chrono::Duration::hours(-2));
        let token = stale.issue(&Session::default()).unwrap();
        assert_eq!(keys().verify(&token), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(keys().verify("not-a-token"), None);
    }
}
