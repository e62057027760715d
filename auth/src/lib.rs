//! Authentication primitives for the admin application.
//!
//! Provides the building blocks of the session lifecycle:
//! - Password hashing and verification (Argon2id)
//! - Signed access tokens (HS256 JWT with issuer, audience and expiry)
//! - Opaque refresh tokens (64 random bytes, base64)
//! - An [`Authenticator`] coordinating all three
//!
//! The crate knows nothing about how principals are stored; services map their
//! own records to an [`Identity`] and persist [`RefreshToken`]s themselves.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//! use auth::PasswordVerification;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let outcome = hasher.verify("my_password", &hash).unwrap();
//! assert_eq!(outcome, PasswordVerification::Verified);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::AuthSettings;
//! use auth::Authenticator;
//! use auth::Identity;
//! use chrono::Duration;
//!
//! let authenticator = Authenticator::new(AuthSettings {
//!     signing_key: "secret_key_at_least_32_bytes_long!".to_string(),
//!     issuer: "bacha".to_string(),
//!     audience: "bacha-clients".to_string(),
//!     access_token_ttl: Duration::minutes(60),
//!     refresh_token_ttl: Duration::days(7),
//! })
//! .unwrap();
//!
//! // Register: hash password
//! let hash = authenticator.hash_password("password123").unwrap();
//!
//! // Login: verify, then issue the token pair
//! authenticator.verify_password("password123", &hash).unwrap();
//! let identity = Identity {
//!     subject: "user123".to_string(),
//!     name: "alice".to_string(),
//!     email: "alice@example.com".to_string(),
//!     role: "User".to_string(),
//! };
//! let access = authenticator.issue_access_token(&identity).unwrap();
//! let refresh = authenticator.issue_refresh_token();
//!
//! // Later requests
//! let claims = authenticator.validate_access_token(&access.token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert!(authenticator.validate_refresh_token(Some(&refresh), &refresh.token));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod refresh;

pub use authenticator::AuthSettings;
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::IssuedAccessToken;
pub use authenticator::DEFAULT_ACCESS_TOKEN_TTL_MINUTES;
pub use authenticator::DEFAULT_REFRESH_TOKEN_TTL_DAYS;
pub use jwt::Claims;
pub use jwt::Identity;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordVerification;
pub use refresh::RefreshToken;
