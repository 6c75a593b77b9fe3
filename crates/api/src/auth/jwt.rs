//! Portal session tokens.
//!
//! A login hands out two tokens. The access token is an HS256-signed JWT
//! carrying [`Claims`]; handlers trust its `sub` and `role` without a database
//! lookup until it expires. The refresh token is an opaque random string that
//! can be exchanged once for a new pair. Only its SHA-256 digest is kept in
//! `user_sessions`, so the plaintext exists solely on the client.

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use nextmove_core::roles::{ROLE_ADMIN, ROLE_CUSTOMER};
use nextmove_core::tokens::{hash_token, random_token, GeneratedToken};
use nextmove_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a generated refresh token.
pub const REFRESH_TOKEN_LENGTH: usize = 64;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// [`ROLE_ADMIN`] or [`ROLE_CUSTOMER`]. Tokens with any other role are
    /// rejected by [`validate_token`].
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4), logged on authentication failures.
    pub jti: String,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl_secs` from now.
    fn issue(user_id: DbId, role: &str, ttl_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id,
            role: role.to_string(),
            exp: now + ttl_secs,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        }
    }

    fn has_known_role(&self) -> bool {
        self.role == ROLE_ADMIN || self.role == ROLE_CUSTOMER
    }
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 60).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7). Stored on the session row
    /// as `expires_at`.
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `60`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty, or if either expiry is
    /// not a positive integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins =
            positive_env("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS);
        let refresh_token_expiry_days =
            positive_env("JWT_REFRESH_EXPIRY_DAYS", DEFAULT_REFRESH_EXPIRY_DAYS);

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }

    /// Access token lifetime in seconds, as reported to clients in `expiresIn`.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

fn positive_env(key: &str, default: i64) -> i64 {
    let value: i64 = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{key} must be a valid i64"));
    assert!(value > 0, "{key} must be positive");
    value
}

/// Generate an HS256 access token for the given user.
///
/// The token carries the user id, role, issue time, expiration, and a unique
/// `jti`. Approval is not encoded: pending customers never get a token,
/// because login refuses them before this is called.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, JwtError> {
    let claims = Claims::issue(user_id, role, config.access_token_ttl_secs());

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the HS256 signature and expiration (with the library's default
/// leeway). A token whose role is neither admin nor customer is rejected as
/// `InvalidToken` even when its signature is valid.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, JwtError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    let claims = token_data.claims;
    if !claims.has_known_role() {
        tracing::warn!(jti = %claims.jti, role = %claims.role, "Token with unknown role");
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(claims)
}

/// Generate a random refresh token.
///
/// The plaintext is sent to the client once; only `hash` is persisted on the
/// session row.
pub fn generate_refresh_token() -> GeneratedToken {
    let plaintext = random_token(REFRESH_TOKEN_LENGTH);
    let hash = hash_refresh_token(&plaintext);
    GeneratedToken { plaintext, hash }
}

/// Compute the SHA-256 hex digest of a refresh token as received from a
/// client. Surrounding whitespace is ignored.
///
/// Use this to look up the session for an incoming refresh token.
pub fn hash_refresh_token(token: &str) -> String {
    hash_token(token)
}
