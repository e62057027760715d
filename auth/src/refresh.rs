use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

/// Number of random bytes behind every refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// Opaque refresh token together with the instant it stops being accepted.
///
/// Token and expiry travel as one value so a stored token never exists
/// without its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Generate a fresh token from the OS random source, valid for `ttl`.
    pub fn generate(ttl: Duration) -> Self {
        Self::generate_at(Utc::now(), ttl)
    }

    pub fn generate_at(now: DateTime<Utc>, ttl: Duration) -> Self {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);

        Self {
            token: STANDARD.encode(bytes),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Check a presented refresh token against the one stored for a principal.
///
/// True only when a non-empty token is stored, it has not expired at `now`,
/// and it equals the presented value exactly.
pub fn validate_refresh_token(
    stored: Option<&RefreshToken>,
    presented: &str,
    now: DateTime<Utc>,
) -> bool {
    match stored {
        Some(stored) if !stored.token.is_empty() && !presented.is_empty() => {
            !stored.is_expired_at(now) && stored.token == presented
        }
        _ => false,
    }
}
