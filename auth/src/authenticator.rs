use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::Identity;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::password::PasswordVerification;
use crate::refresh::validate_refresh_token;
use crate::refresh::RefreshToken;

/// Settings required to build an [`Authenticator`].
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub signing_key: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 60;

/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 7;

const UNKNOWN_PRINCIPAL_PASSWORD: &str = "unknown-principal-placeholder";

/// Signed access token with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication coordinator combining password verification, access token
/// signing and refresh token handling.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    /// Hash checked when no principal matches, so both rejections cost one Argon2 verification.
    unknown_principal_hash: String,
    jwt_handler: JwtHandler,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT signing key is missing from configuration")]
    MissingSigningKey,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Errors
    /// * `MissingSigningKey` - The signing key is empty or blank
    /// * `PasswordError` - The placeholder hash could not be computed
    pub fn new(settings: AuthSettings) -> Result<Self, AuthenticationError> {
        if settings.signing_key.trim().is_empty() {
            return Err(AuthenticationError::MissingSigningKey);
        }

        let password_hasher = PasswordHasher::new();
        let unknown_principal_hash = password_hasher.hash(UNKNOWN_PRINCIPAL_PASSWORD)?;

        Ok(Self {
            password_hasher,
            unknown_principal_hash,
            jwt_handler: JwtHandler::new(
                settings.signing_key.as_bytes(),
                settings.issuer,
                settings.audience,
            ),
            access_token_ttl: settings.access_token_ttl,
            refresh_token_ttl: settings.refresh_token_ttl,
        })
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a presented password against a stored hash.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthenticationError> {
        match self.password_hasher.verify(password, stored_hash)? {
            PasswordVerification::Verified => Ok(()),
            PasswordVerification::Failed => Err(AuthenticationError::InvalidCredentials),
        }
    }

    /// Verify a presented password against the stored hash of a principal
    /// that may not exist.
    ///
    /// Without a stored hash the password is still checked against a
    /// placeholder hash and the outcome is always `InvalidCredentials`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No stored hash, or password does not match
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password_or_placeholder(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<(), AuthenticationError> {
        match stored_hash {
            Some(stored_hash) => self.verify_password(password, stored_hash),
            None => {
                let _ = self
                    .password_hasher
                    .verify(password, &self.unknown_principal_hash)?;
                Err(AuthenticationError::InvalidCredentials)
            }
        }
    }

    /// Sign an access token for `identity` using the configured lifetime.
    pub fn issue_access_token(&self, identity: &Identity) -> Result<IssuedAccessToken, JwtError> {
        self.issue_access_token_with_ttl(identity, self.access_token_ttl)
    }

    /// Sign an access token for `identity` valid for `ttl` from now.
    pub fn issue_access_token_with_ttl(
        &self,
        identity: &Identity,
        ttl: Duration,
    ) -> Result<IssuedAccessToken, JwtError> {
        let claims = Claims::for_identity(
            identity,
            self.jwt_handler.issuer(),
            self.jwt_handler.audience(),
            Utc::now(),
            ttl,
        );
        let token = self.jwt_handler.encode(&claims)?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| JwtError::EncodingFailed("expiry out of range".to_string()))?;

        Ok(IssuedAccessToken { token, expires_at })
    }

    /// Generate an opaque refresh token using the configured lifetime.
    pub fn issue_refresh_token(&self) -> RefreshToken {
        RefreshToken::generate(self.refresh_token_ttl)
    }

    /// Check a presented refresh token against the stored one.
    pub fn validate_refresh_token(&self, stored: Option<&RefreshToken>, presented: &str) -> bool {
        validate_refresh_token(stored, presented, Utc::now())
    }

    /// Validate an access token, enforcing signature, issuer, audience and expiry.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }

    /// Read the claims of a token that may have expired.
    ///
    /// Signature, issuer and audience must still hold. Used only while
    /// refreshing a session.
    pub fn claims_from_expired_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode_expired(token)
    }
}
