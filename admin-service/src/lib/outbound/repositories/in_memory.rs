use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::ports::PrincipalRepository;
use crate::principal::errors::PrincipalError;

/// Principal store held in process memory.
///
/// Mirrors the Postgres adapter: case-insensitive username and email
/// uniqueness and lookup, single-record replace on update.
#[derive(Default)]
pub struct InMemoryPrincipalRepository {
    principals: RwLock<HashMap<PrincipalId, Principal>>,
}

impl InMemoryPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique<'a>(
        principal: &Principal,
        mut others: impl Iterator<Item = &'a Principal>,
    ) -> Result<(), PrincipalError> {
        let username = principal.username.as_str().to_lowercase();
        let email = principal.email.as_str().to_lowercase();

        others.try_for_each(|other| {
            if other.id == principal.id {
                Ok(())
            } else if other.username.as_str().to_lowercase() == username {
                Err(PrincipalError::UsernameAlreadyExists(
                    principal.username.as_str().to_string(),
                ))
            } else if other.email.as_str().to_lowercase() == email {
                Err(PrincipalError::EmailAlreadyExists(
                    principal.email.as_str().to_string(),
                ))
            } else {
                Ok(())
            }
        })
    }
}

#[async_trait]
impl PrincipalRepository for InMemoryPrincipalRepository {
    async fn create(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let mut principals = self.principals.write().await;

        if principals.contains_key(&principal.id) {
            return Err(PrincipalError::DatabaseError(format!(
                "duplicate principal id: {}",
                principal.id
            )));
        }
        Self::check_unique(&principal, principals.values())?;

        principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, PrincipalError> {
        Ok(self.principals.read().await.get(id).cloned())
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>, PrincipalError> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .find(|p| p.is_identified_by(identifier))
            .cloned())
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<Principal>, PrincipalError> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .find(|p| p.refresh_token.as_ref().is_some_and(|r| r.token == token))
            .cloned())
    }

    async fn update(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let mut principals = self.principals.write().await;

        if !principals.contains_key(&principal.id) {
            return Err(PrincipalError::NotFound(principal.id.to_string()));
        }
        Self::check_unique(&principal, principals.values())?;

        principals.insert(principal.id, principal.clone());
        Ok(principal)
    }
}
