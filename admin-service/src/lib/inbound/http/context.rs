use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;

/// Identity of the caller, attached to request extensions by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub id: PrincipalId,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl AuthenticatedPrincipal {
    /// Build from validated token claims.
    ///
    /// # Errors
    /// The subject claim is not a principal id
    pub fn from_claims(
        claims: &auth::Claims,
    ) -> Result<Self, crate::principal::errors::PrincipalIdError> {
        Ok(Self {
            id: PrincipalId::from_string(&claims.sub)?,
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role.clone(),
        })
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.eq_ignore_ascii_case(role)
    }
}

impl From<&Principal> for AuthenticatedPrincipal {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            name: principal.username.as_str().to_string(),
            email: principal.email.as_str().to_string(),
            role: principal.role.clone(),
        }
    }
}

/// Request-scoped accessor for the authenticated caller, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentPrincipal(Option<AuthenticatedPrincipal>);

impl CurrentPrincipal {
    pub fn current_principal(&self) -> Option<&AuthenticatedPrincipal> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthenticatedPrincipal>().cloned()))
    }
}
