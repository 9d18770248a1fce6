//! JWT issuance and verification for the unigate service.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::AuthConfig;
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error, Result};

/// JWT claims structure.
///
/// A fixed record rather than an open claim bag: tokens carry exactly the
/// subject, display name, and role names granted at issuance time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,
    /// Display name of the subject
    pub name: String,
    /// Role claims, one entry per granted role, order-preserving
    pub roles: Vec<String>,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Expiration time (seconds since epoch)
    pub exp: usize,
    /// Issued at time (seconds since epoch)
    pub iat: usize,
}

/// Issues and verifies signed, time-bounded identity assertions.
///
/// Issuance is stateless: nothing is persisted, and a token is valid until
/// its expiry regardless of later account-state changes.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl_minutes: i64,
}

impl TokenIssuer {
    /// Build an issuer from configuration.
    ///
    /// Fails when the signing key is empty or the TTL is not positive; a
    /// token must never be issued unsigned or unbounded, so these are fatal
    /// at startup.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        if config.signing_key.is_empty() {
            return Err(Error::config("JWT signing key must not be empty"));
        }
        if config.token_ttl_minutes <= 0 {
            return Err(Error::config("Token TTL must be a positive number of minutes"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl_minutes: config.token_ttl_minutes,
        })
    }

    /// Issue a token for the given user and role set.
    pub fn issue(
        &self,
        user_id: &UserId,
        display_name: &str,
        role_names: &[String],
    ) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| Error::internal("System clock is before the epoch"))?
            .as_secs() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            name: display_name.to_string(),
            roles: role_names.to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: now + (self.ttl_minutes as usize) * 60,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| Error::internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token's signature, expiry, issuer, and audience, returning
    /// its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let error_type = match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthErrorType::ExpiredToken,
                _ => AuthErrorType::InvalidToken,
            };
            Error::auth(format!("Token validation failed: {}", e), error_type)
        })?;
        Ok(data.claims)
    }
}
