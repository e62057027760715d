use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Lifetime handling applied when validating a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifetime {
    Enforced,
    Ignored,
}

/// JWT token handler for encoding and decoding access tokens.
///
/// Signs with HS256 (HMAC with SHA-256) and only accepts HS256 tokens whose
/// issuer and audience match the configured values.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
}

impl JwtHandler {
    /// Create a new JWT handler.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing key
    /// * `issuer` - Value written to and required in the `iss` claim
    /// * `audience` - Value written to and required in the `aud` claim
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], issuer: impl ToString, audience: impl ToString) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Encode claims into a signed JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a token, enforcing signature, issuer, audience and expiry.
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` is in the past
    /// * `InvalidSignature` - Signature does not match the signing key
    /// * `UntrustedOrigin` - Issuer or audience mismatch
    /// * `Malformed` - Token cannot be parsed or uses another algorithm
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_with(token, Lifetime::Enforced)
    }

    /// Decode a token whose lifetime may already have elapsed.
    ///
    /// Signature, issuer and audience are still enforced. Only for controlled
    /// refresh flows; never use the result to authorise a request.
    pub fn decode_expired(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_with(token, Lifetime::Ignored)
    }

    fn decode_with(&self, token: &str, lifetime: Lifetime) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;
        validation.validate_exp = lifetime == Lifetime::Enforced;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => JwtError::UntrustedOrigin,
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}
