use std::fmt;
use std::str::FromStr;

use auth::Identity;
use auth::RefreshToken;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::principal::errors::EmailError;
use crate::principal::errors::FieldErrors;
use crate::principal::errors::PrincipalIdError;
use crate::principal::errors::UsernameError;

/// Role assigned to self-registered principals.
pub const DEFAULT_ROLE: &str = "User";

/// Role label required by the admin area.
pub const ADMIN_ROLE: &str = "Admin";

/// Principal aggregate entity.
///
/// A registered identity with its credentials, role and current refresh
/// session. `refresh_token` holds the token together with its expiry, so the
/// two are always present or absent together.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: PrincipalId,
    pub username: Username,
    pub email: EmailAddress,
    pub full_name: String,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
    pub refresh_token: Option<RefreshToken>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Identity attributes embedded into signed tokens.
    pub fn identity(&self) -> Identity {
        Identity {
            subject: self.id.to_string(),
            name: self.username.as_str().to_string(),
            email: self.email.as_str().to_string(),
            role: self.role.clone(),
        }
    }

    /// Whether `identifier` names this principal, by username or email, ignoring case.
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        let identifier = identifier.trim().to_lowercase();
        self.username.as_str().to_lowercase() == identifier
            || self.email.as_str().to_lowercase() == identifier
    }
}

/// Principal unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Generate a new random principal ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a principal ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, PrincipalIdError> {
        Uuid::parse_str(s)
            .map(PrincipalId)
            .map_err(|e| PrincipalIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Missing` - Username is blank
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(UsernameError::Missing);
        }
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Missing` - Email is blank
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_string();
        if email.is_empty() {
            return Err(EmailError::Missing);
        }
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How a successful sign-in is carried back to the client.
///
/// Exactly one mode is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Short-lived access token plus a rotating refresh token stored on the principal.
    #[default]
    Bearer,
    /// A single long-lived signed session cookie; no server-side refresh state.
    Cookie,
}

/// Command to sign in with a username or email and a password.
#[derive(Debug)]
pub struct LoginCommand {
    pub identifier: String,
    pub password: String,
}

impl LoginCommand {
    /// # Errors
    /// Field errors when the identifier or password is blank
    pub fn new(identifier: String, password: String) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        if identifier.trim().is_empty() {
            errors.add("usernameOrEmail", "Username or email is required");
        }
        if password.trim().is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result(Self {
            identifier: identifier.trim().to_string(),
            password,
        })
    }
}

/// Command to register a new principal with validated fields.
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub full_name: String,
    pub password: String,
}

impl RegisterCommand {
    const FULL_NAME_MAX_LENGTH: usize = 100;
    const PASSWORD_MIN_LENGTH: usize = 6;

    /// Validate every field, reporting all failures together.
    ///
    /// # Errors
    /// Field errors keyed by `username`, `email`, `fullName` and `password`
    pub fn new(
        username: String,
        email: String,
        full_name: String,
        password: String,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = Username::new(username)
            .map_err(|e| errors.add("username", e))
            .ok();
        let email = EmailAddress::new(email)
            .map_err(|e| errors.add("email", e))
            .ok();

        let full_name = full_name.trim().to_string();
        if full_name.is_empty() {
            errors.add("fullName", "Full name is required");
        } else if full_name.chars().count() > Self::FULL_NAME_MAX_LENGTH {
            errors.add(
                "fullName",
                format!(
                    "Full name too long: maximum {} characters",
                    Self::FULL_NAME_MAX_LENGTH
                ),
            );
        }

        if password.is_empty() {
            errors.add("password", "Password is required");
        } else if password.chars().count() < Self::PASSWORD_MIN_LENGTH {
            errors.add(
                "password",
                format!(
                    "Password too short: minimum {} characters",
                    Self::PASSWORD_MIN_LENGTH
                ),
            );
        }

        match (username, email) {
            (Some(username), Some(email)) if errors.is_empty() => Ok(Self {
                username,
                email,
                full_name,
                password,
            }),
            _ => Err(errors),
        }
    }
}

/// Command to rotate a session using its refresh token.
#[derive(Debug)]
pub struct RefreshCommand {
    pub refresh_token: String,
    /// Access token presented alongside, possibly expired. When present its
    /// subject must match the refresh token's owner.
    pub access_token: Option<String>,
}

/// Command to create a principal unless one with the same username exists.
///
/// Skips request-level validation; used for bootstrap accounts.
#[derive(Debug, Clone)]
pub struct SeedPrincipalCommand {
    pub id: Option<PrincipalId>,
    pub username: Username,
    pub email: EmailAddress,
    pub full_name: String,
    pub password: String,
    pub role: String,
}

/// Credentials produced by a successful sign-in or refresh.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub principal: Principal,
    pub mode: SessionMode,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    /// Present in bearer mode only.
    pub refresh_token: Option<RefreshToken>,
}
