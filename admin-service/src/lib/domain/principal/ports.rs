use async_trait::async_trait;

use crate::domain::principal::models::IssuedSession;
use crate::domain::principal::models::LoginCommand;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::RefreshCommand;
use crate::domain::principal::models::RegisterCommand;
use crate::principal::errors::PrincipalError;

/// Port for the session lifecycle: sign-in, registration, refresh and sign-out.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify credentials and sign the principal in.
    ///
    /// # Arguments
    /// * `command` - Username or email (case-insensitive) and password
    ///
    /// # Returns
    /// Issued session for the configured session mode
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier, wrong password or inactive principal
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<IssuedSession, PrincipalError>;

    /// Create a principal and sign it in.
    ///
    /// # Arguments
    /// * `command` - Validated registration fields
    ///
    /// # Returns
    /// Issued session for the new principal
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<IssuedSession, PrincipalError>;

    /// Rotate a session: validate the refresh token, then issue and persist a new pair.
    ///
    /// # Arguments
    /// * `command` - Presented refresh token and optional access token
    ///
    /// # Returns
    /// Issued session with a new access token and refresh token
    ///
    /// # Errors
    /// * `RefreshTokenRejected` - Token unknown, mismatched, expired, owned by an
    ///   inactive principal, or not matching the presented access token
    /// * `DatabaseError` - Persisting the rotated token failed
    async fn refresh(&self, command: RefreshCommand) -> Result<IssuedSession, PrincipalError>;

    /// Clear the stored refresh token of a principal.
    ///
    /// Best-effort: an unknown principal or an already cleared token is not an error.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn logout(&self, id: &PrincipalId) -> Result<(), PrincipalError>;
}

/// Persistence operations for the principal aggregate.
#[async_trait]
pub trait PrincipalRepository: Send + Sync + 'static {
    /// Persist new principal to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken (case-insensitive)
    /// * `EmailAlreadyExists` - Email is already registered (case-insensitive)
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, principal: Principal) -> Result<Principal, PrincipalError>;

    /// Retrieve principal by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, PrincipalError>;

    /// Retrieve principal whose username or email equals `identifier`, ignoring case.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>, PrincipalError>;

    /// Retrieve principal currently holding `token` as its refresh token.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_refresh_token(&self, token: &str)
        -> Result<Option<Principal>, PrincipalError>;

    /// Replace the stored principal record as a single write.
    ///
    /// # Errors
    /// * `NotFound` - Principal does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, principal: Principal) -> Result<Principal, PrincipalError>;
}
