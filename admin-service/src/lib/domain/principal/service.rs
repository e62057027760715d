use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::principal::models::IssuedSession;
use crate::domain::principal::models::LoginCommand;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::RefreshCommand;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::SeedPrincipalCommand;
use crate::domain::principal::models::SessionMode;
use crate::domain::principal::models::DEFAULT_ROLE;
use crate::principal::errors::PrincipalError;
use crate::principal::ports::PrincipalRepository;
use crate::principal::ports::SessionServicePort;

/// Domain service implementation for the session lifecycle.
///
/// Concrete implementation of SessionServicePort with dependency injection.
/// Refresh rotation is not serialised per principal: two requests racing with
/// the same refresh token may both succeed, and the loser's next refresh fails.
pub struct SessionService<PR>
where
    PR: PrincipalRepository,
{
    repository: Arc<PR>,
    authenticator: Arc<Authenticator>,
    mode: SessionMode,
}

impl<PR> SessionService<PR>
where
    PR: PrincipalRepository,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Principal persistence implementation
    /// * `authenticator` - Password verification and token issuing
    /// * `mode` - How sign-ins are carried to clients
    pub fn new(repository: Arc<PR>, authenticator: Arc<Authenticator>, mode: SessionMode) -> Self {
        Self {
            repository,
            authenticator,
            mode,
        }
    }

    /// Create a principal unless one with the same username already exists.
    ///
    /// # Returns
    /// The created principal, or `None` when it was already present
    pub async fn seed_principal(
        &self,
        command: SeedPrincipalCommand,
    ) -> Result<Option<Principal>, PrincipalError> {
        if self
            .repository
            .find_by_identifier(command.username.as_str())
            .await?
            .is_some()
        {
            tracing::debug!(username = %command.username, "Seed principal already present");
            return Ok(None);
        }

        let now = Utc::now();
        let principal = Principal {
            id: command.id.unwrap_or_default(),
            username: command.username,
            email: command.email,
            full_name: command.full_name,
            role: command.role,
            password_hash: self.authenticator.hash_password(&command.password)?,
            is_active: true,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(principal).await?;
        tracing::info!(
            principal_id = %created.id,
            username = %created.username,
            role = %created.role,
            "Seed principal created"
        );

        Ok(Some(created))
    }

    /// Issue credentials for an authenticated principal according to the session mode.
    async fn sign_in(&self, mut principal: Principal) -> Result<IssuedSession, PrincipalError> {
        let identity = principal.identity();

        match self.mode {
            SessionMode::Bearer => {
                let access = self.authenticator.issue_access_token(&identity)?;
                let refresh = self.authenticator.issue_refresh_token();

                principal.refresh_token = Some(refresh.clone());
                principal.updated_at = Utc::now();
                let principal = self.repository.update(principal).await?;

                Ok(IssuedSession {
                    principal,
                    mode: self.mode,
                    access_token: access.token,
                    access_token_expires_at: access.expires_at,
                    refresh_token: Some(refresh),
                })
            }
            SessionMode::Cookie => {
                let access = self
                    .authenticator
                    .issue_access_token_with_ttl(&identity, self.authenticator.refresh_token_ttl())?;

                let principal = if principal.refresh_token.is_some() {
                    principal.refresh_token = None;
                    principal.updated_at = Utc::now();
                    self.repository.update(principal).await?
                } else {
                    principal
                };

                Ok(IssuedSession {
                    principal,
                    mode: self.mode,
                    access_token: access.token,
                    access_token_expires_at: access.expires_at,
                    refresh_token: None,
                })
            }
        }
    }
}

#[async_trait]
impl<PR> SessionServicePort for SessionService<PR>
where
    PR: PrincipalRepository,
{
    async fn login(&self, command: LoginCommand) -> Result<IssuedSession, PrincipalError> {
        let principal = self
            .repository
            .find_by_identifier(&command.identifier)
            .await?;

        let verification = self.authenticator.verify_password_or_placeholder(
            &command.password,
            principal.as_ref().map(|p| p.password_hash.as_str()),
        );

        let principal = match (principal, verification) {
            (None, _) => {
                tracing::info!(reason = "unknown_identifier", "Login rejected");
                return Err(PrincipalError::InvalidCredentials);
            }
            (Some(principal), Ok(())) => principal,
            (Some(principal), Err(AuthenticationError::InvalidCredentials)) => {
                tracing::info!(principal_id = %principal.id, reason = "wrong_password", "Login rejected");
                return Err(PrincipalError::InvalidCredentials);
            }
            (Some(principal), Err(e)) => {
                tracing::error!(principal_id = %principal.id, error = %e, "Password verification failed");
                return Err(PrincipalError::InvalidCredentials);
            }
        };

        if !principal.is_active {
            tracing::info!(principal_id = %principal.id, reason = "inactive", "Login rejected");
            return Err(PrincipalError::InvalidCredentials);
        }

        let session = self.sign_in(principal).await?;
        tracing::info!(
            principal_id = %session.principal.id,
            mode = ?session.mode,
            "Principal signed in"
        );

        Ok(session)
    }

    async fn register(&self, command: RegisterCommand) -> Result<IssuedSession, PrincipalError> {
        let password_hash = self.authenticator.hash_password(&command.password)?;

        let now = Utc::now();
        let principal = Principal {
            id: PrincipalId::new(),
            username: command.username,
            email: command.email,
            full_name: command.full_name,
            role: DEFAULT_ROLE.to_string(),
            password_hash,
            is_active: true,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(principal).await?;
        tracing::info!(principal_id = %created.id, username = %created.username, "Principal registered");

        self.sign_in(created).await
    }

    async fn refresh(&self, command: RefreshCommand) -> Result<IssuedSession, PrincipalError> {
        let Some(principal) = self
            .repository
            .find_by_refresh_token(&command.refresh_token)
            .await?
        else {
            tracing::info!(reason = "unknown_token", "Refresh rejected");
            return Err(PrincipalError::RefreshTokenRejected);
        };

        if !principal.is_active {
            tracing::info!(principal_id = %principal.id, reason = "inactive", "Refresh rejected");
            return Err(PrincipalError::RefreshTokenRejected);
        }

        if !self
            .authenticator
            .validate_refresh_token(principal.refresh_token.as_ref(), &command.refresh_token)
        {
            tracing::info!(principal_id = %principal.id, reason = "mismatch_or_expired", "Refresh rejected");
            return Err(PrincipalError::RefreshTokenRejected);
        }

        if let Some(access_token) = command.access_token.as_deref() {
            let subject_matches = self
                .authenticator
                .claims_from_expired_token(access_token)
                .map(|claims| claims.sub == principal.id.to_string())
                .unwrap_or(false);

            if !subject_matches {
                tracing::warn!(principal_id = %principal.id, reason = "access_token_mismatch", "Refresh rejected");
                return Err(PrincipalError::RefreshTokenRejected);
            }
        }

        let session = self.sign_in(principal).await?;
        tracing::info!(principal_id = %session.principal.id, "Session refreshed");

        Ok(session)
    }

    async fn logout(&self, id: &PrincipalId) -> Result<(), PrincipalError> {
        let Some(mut principal) = self.repository.find_by_id(id).await? else {
            tracing::debug!(principal_id = %id, "Logout for unknown principal");
            return Ok(());
        };

        if principal.refresh_token.is_none() {
            return Ok(());
        }

        principal.refresh_token = None;
        principal.updated_at = Utc::now();
        match self.repository.update(principal).await {
            Ok(_) | Err(PrincipalError::NotFound(_)) => {
                tracing::info!(principal_id = %id, "Refresh token cleared");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
