//! Bearer token codec.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp, jti}`. The codec is
//! stateless: a token is valid if its signature checks out under the process
//! secret and `now < exp`. Whether it is the *current* token for its subject
//! is the session registry's concern, not the codec's.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::types::UserId;

/// Token errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token could not be produced
    Signing(String),
    /// Not a well-formed JWT, or missing claims
    Malformed,
    /// Signature does not match the process secret
    InvalidSignature,
    /// `now >= exp`
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signing(msg) => write!(f, "failed to sign token: {}", msg),
            Self::Malformed => write!(f, "malformed token"),
            Self::InvalidSignature => write!(f, "invalid token signature"),
            Self::Expired => write!(f, "token has expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (user identity)
    pub sub: String,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Unique token ID; keeps two tokens issued in the same second distinct
    pub jti: String,
}

/// Signs and verifies bearer tokens with a fixed HS256 secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret()),
            validation,
            ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    /// Issue a token for `identity`, valid from now for the configured TTL.
    pub fn issue(&self, identity: &UserId) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    fn issue_at(&self, identity: &UserId, issued_at: i64) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: identity.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl.num_seconds(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the subject identity.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;
        let claims = data.claims;

        // jsonwebtoken accepts exp == now; we require now < exp.
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }

        Ok(UserId::new(claims.sub))
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashCost;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(&AuthConfig::new(secret, 24, HashCost::cheap()).unwrap())
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = codec("secret-a");
        let identity = UserId::generate();

        let token = codec.issue(&identity).unwrap();
        assert_eq!(codec.verify(&token).unwrap(), identity);
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let codec = codec("secret-a");
        let identity = UserId::generate();

        let t1 = codec.issue(&identity).unwrap();
        let t2 = codec.issue(&identity).unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_expiry_is_ttl_after_issue() {
        let codec = codec("secret-a");
        let token = codec.issue_at(&UserId::generate(), 1_000).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<TokenClaims>(
            &token,
            &DecodingKey::from_secret(b"secret-a"),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims.iat, 1_000);
        assert_eq!(data.claims.exp, 1_000 + 24 * 3600);
    }

    #[test]
    fn test_different_secret_rejected() {
        let token = codec("secret-a").issue(&UserId::generate()).unwrap();
        assert_eq!(
            codec("secret-b").verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec("secret-a");
        let issued_long_ago = Utc::now().timestamp() - 48 * 3600;
        let token = codec.issue_at(&UserId::generate(), issued_long_ago).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = codec("secret-a");
        assert_eq!(codec.verify("not.a.jwt"), Err(TokenError::Malformed));
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec("secret-a");
        let token = codec.issue(&UserId::new("alice-id")).unwrap();

        let forged_claims = TokenClaims {
            sub: "mallory-id".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
            jti: "x".to_string(),
        };
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &forged_claims,
            &EncodingKey::from_secret(b"attacker-secret"),
        )
        .unwrap();

        assert!(codec.verify(&token).is_ok());
        assert_eq!(codec.verify(&forged), Err(TokenError::InvalidSignature));
    }
}
