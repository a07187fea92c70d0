use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // Subject (verified phone number)
    pub phone: String, // Verified phone number, E.164
    pub exp: i64,      // Expiration timestamp
    pub iat: i64,      // Issued at timestamp
    pub iss: String,   // Issuer
    pub jti: String,   // JWT ID (unique token identifier)
}

/// Token creation and validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    ConfigInvalid,

    #[error("phone number required")]
    InvalidPhone,

    #[error("signing token failed: {0}")]
    SigningFailed(String),

    #[error("token missing")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid signing algorithm")]
    InvalidAlgorithm,

    #[error("missing required claims")]
    MissingClaims,

    #[error("token expired")]
    Expired,
}

/// JWT Service - creates and verifies JWT tokens bound to a phone number
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: chrono::Duration,
}

impl JwtService {
    /// Create new JWT service with secret, issuer and token lifetime
    pub fn new(secret: &str, issuer: String, ttl: chrono::Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::ConfigInvalid);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl,
        })
    }

    /// Create a new HS256 token carrying the verified phone number
    pub fn create_token(&self, phone: &str) -> Result<String, TokenError> {
        if phone.is_empty() {
            return Err(TokenError::InvalidPhone);
        }

        let now = chrono::Utc::now();
        let exp = now + self.ttl;

        let claims = Claims {
            sub: phone.to_string(),
            phone: phone.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify and decode a JWT token
    ///
    /// Only HMAC-family algorithms are accepted.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::MissingToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::InvalidAlgorithm
                }
                ErrorKind::MissingRequiredClaim(_) | ErrorKind::Json(_) => {
                    TokenError::MissingClaims
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidToken,
            })?;

        if claims.phone.is_empty() {
            return Err(TokenError::MissingClaims);
        }

        Ok(claims)
    }

    /// Validate a token and return the phone number it was issued for
    pub fn parse_and_validate(&self, token: &str) -> Result<String, TokenError> {
        self.verify_token(token).map(|claims| claims.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(secret, "test_issuer".to_string(), chrono::Duration::hours(24)).unwrap()
    }

    #[test]
    fn test_create_and_verify_token() {
        let service = service("test_secret_key");

        let token = service.create_token("+15551234567").unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.phone, "+15551234567");
        assert_eq!(claims.sub, "+15551234567");
        assert_eq!(claims.iss, "test_issuer");
        assert_eq!(
            service.parse_and_validate(&token).unwrap(),
            "+15551234567"
        );
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = JwtService::new("", "test_issuer".to_string(), chrono::Duration::hours(1));
        assert_eq!(result.err(), Some(TokenError::ConfigInvalid));
    }

    #[test]
    fn test_empty_phone_rejected() {
        let service = service("test_secret_key");
        assert_eq!(service.create_token(""), Err(TokenError::InvalidPhone));
    }

    #[test]
    fn test_invalid_token() {
        let service = service("test_secret_key");
        assert_eq!(
            service.verify_token("invalid_token").unwrap_err(),
            TokenError::InvalidToken
        );
        assert_eq!(service.verify_token("").unwrap_err(), TokenError::MissingToken);
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = service("secret1");
        let service2 = service("secret2");

        let token = service1.create_token("+15551234567").unwrap();

        // Token created with secret1 should not verify with secret2
        assert_eq!(
            service2.verify_token(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        // header {"alg":"RS256","typ":"JWT"}, payload {}
        let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.e30.c2ln";
        assert_eq!(
            service("test_secret_key").verify_token(token).unwrap_err(),
            TokenError::InvalidAlgorithm
        );
    }

    #[test]
    fn test_missing_phone_claim() {
        #[derive(Serialize)]
        struct PartialClaims {
            sub: String,
            exp: i64,
            iss: String,
        }

        let claims = PartialClaims {
            sub: "+15551234567".to_string(),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
            iss: "test_issuer".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key"),
        )
        .unwrap();

        assert_eq!(
            service("test_secret_key").verify_token(&token).unwrap_err(),
            TokenError::MissingClaims
        );
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(
            "test_secret_key",
            "test_issuer".to_string(),
            chrono::Duration::hours(-1),
        )
        .unwrap();

        let token = service.create_token("+15551234567").unwrap();
        assert_eq!(service.verify_token(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_expiry_window() {
        let service = service("test_secret_key");
        let token = service.create_token("+15551234567").unwrap();
        let claims = service.verify_token(&token).unwrap();

        // Token should expire in ~24 hours
        let now = chrono::Utc::now().timestamp();
        let expires_in = claims.exp - now;
        assert!(expires_in > 23 * 3600);
        assert!(expires_in <= 24 * 3600);
    }
}
