//! Session-bound access tokens and rotating refresh tokens.
//!
//! An access token is an HS256 JWT naming the session it was issued for
//! (`sid`). The auth extractor checks that session on every request, so
//! ending a session in the database also ends every access token minted for
//! it. Refresh tokens are opaque; only their SHA-256 hash is stored.

use std::str::FromStr;

use chrono::Utc;
use hostelcare_core::roles::ActorRole;
use hostelcare_core::types::{DbId, Timestamp};
use hostelcare_db::models::session::SessionPolicy;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Payload of an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub role: ActorRole,
    /// Session id in `user_sessions`.
    pub sid: DbId,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Token signing and session lifetime settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
    /// A session with no authenticated request for this long is over.
    pub session_idle_mins: i32,
}

/// Students are signed out after 30 idle minutes; an access token never
/// outlives that window on its own.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30;
const DEFAULT_SESSION_IDLE_MINS: i32 = 30;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number, got '{raw}'")),
        Err(_) => default,
    }
}

impl JwtConfig {
    /// Load from the environment.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `30`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    /// | `SESSION_IDLE_MINS`        | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or a numeric value does
    /// not parse.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set and non-empty");

        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
            refresh_token_expiry_days: env_or(
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            ),
            session_idle_mins: env_or("SESSION_IDLE_MINS", DEFAULT_SESSION_IDLE_MINS),
        }
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            idle_timeout_mins: self.session_idle_mins,
        }
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// When a refresh token issued now stops working.
    pub fn refresh_expires_at(&self) -> Timestamp {
        Utc::now() + chrono::Duration::days(self.refresh_token_expiry_days)
    }
}

/// Mint an access token for `user_id` acting as `role` within `session_id`.
pub fn issue_access_token(
    user_id: DbId,
    role: ActorRole,
    session_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        sid: session_id,
        exp: now + config.access_ttl_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry and decode the claims. Tokens with an unknown
/// role or without a session id fail to decode.
pub fn decode_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// A freshly generated refresh token. `plaintext` goes to the client once;
/// `hash` is what `user_sessions` keeps.
pub struct RefreshToken {
    pub plaintext: String,
    pub hash: String,
}

impl RefreshToken {
    pub fn generate() -> Self {
        let plaintext = Uuid::new_v4().to_string();
        let hash = hash_refresh_token(&plaintext);
        Self { plaintext, hash }
    }
}

/// SHA-256 hex digest of a refresh token.
pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
