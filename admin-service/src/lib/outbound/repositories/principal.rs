use async_trait::async_trait;
use auth::RefreshToken;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::Username;
use crate::domain::principal::ports::PrincipalRepository;
use crate::principal::errors::PrincipalError;

const SELECT_PRINCIPAL: &str = r#"
    SELECT id, username, email, full_name, role, password_hash, is_active,
           refresh_token, refresh_token_expires_at, created_at, updated_at
    FROM principals
"#;

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    username: String,
    email: String,
    full_name: String,
    role: String,
    password_hash: String,
    is_active: bool,
    refresh_token: Option<String>,
    refresh_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = PrincipalError;

    fn try_from(r: PrincipalRow) -> Result<Self, Self::Error> {
        let refresh_token = match (r.refresh_token, r.refresh_token_expires_at) {
            (Some(token), Some(expires_at)) => Some(RefreshToken { token, expires_at }),
            _ => None,
        };

        Ok(Principal {
            id: PrincipalId(r.id),
            username: Username::new(r.username)?,
            email: EmailAddress::new(r.email)?,
            full_name: r.full_name,
            role: r.role,
            password_hash: r.password_hash,
            is_active: r.is_active,
            refresh_token,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub struct PostgresPrincipalRepository {
    pool: PgPool,
}

impl PostgresPrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_error(e: sqlx::Error, principal: &Principal) -> PrincipalError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                if db_err.constraint() == Some("principals_username_key") {
                    return PrincipalError::UsernameAlreadyExists(
                        principal.username.as_str().to_string(),
                    );
                }
                if db_err.constraint() == Some("principals_email_key") {
                    return PrincipalError::EmailAlreadyExists(
                        principal.email.as_str().to_string(),
                    );
                }
            }
        }
        PrincipalError::DatabaseError(e.to_string())
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        value: &str,
    ) -> Result<Option<Principal>, PrincipalError> {
        let query = format!("{} WHERE {} LIMIT 1", SELECT_PRINCIPAL, condition);
        let row = sqlx::query_as::<_, PrincipalRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PrincipalError::DatabaseError(e.to_string()))?;

        row.map(Principal::try_from).transpose()
    }
}

#[async_trait]
impl PrincipalRepository for PostgresPrincipalRepository {
    async fn create(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let (refresh_token, refresh_token_expires_at) = match &principal.refresh_token {
            Some(refresh) => (Some(refresh.token.as_str()), Some(refresh.expires_at)),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO principals (id, username, email, full_name, role, password_hash, is_active,
                                    refresh_token, refresh_token_expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(principal.id.0)
        .bind(principal.username.as_str())
        .bind(principal.email.as_str())
        .bind(&principal.full_name)
        .bind(&principal.role)
        .bind(&principal.password_hash)
        .bind(principal.is_active)
        .bind(refresh_token)
        .bind(refresh_token_expires_at)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &principal))?;

        Ok(principal)
    }

    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, PrincipalError> {
        let query = format!("{} WHERE id = $1", SELECT_PRINCIPAL);
        let row = sqlx::query_as::<_, PrincipalRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PrincipalError::DatabaseError(e.to_string()))?;

        row.map(Principal::try_from).transpose()
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>, PrincipalError> {
        self.fetch_one_where(
            "LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)",
            identifier.trim(),
        )
        .await
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<Principal>, PrincipalError> {
        self.fetch_one_where("refresh_token = $1", token).await
    }

    async fn update(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let (refresh_token, refresh_token_expires_at) = match &principal.refresh_token {
            Some(refresh) => (Some(refresh.token.as_str()), Some(refresh.expires_at)),
            None => (None, None),
        };

        let result = sqlx::query(
            r#"
            UPDATE principals
            SET username = $2, email = $3, full_name = $4, role = $5, password_hash = $6,
                is_active = $7, refresh_token = $8, refresh_token_expires_at = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(principal.id.0)
        .bind(principal.username.as_str())
        .bind(principal.email.as_str())
        .bind(&principal.full_name)
        .bind(&principal.role)
        .bind(&principal.password_hash)
        .bind(principal.is_active)
        .bind(refresh_token)
        .bind(refresh_token_expires_at)
        .bind(principal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &principal))?;

        if result.rows_affected() == 0 {
            return Err(PrincipalError::NotFound(principal.id.to_string()));
        }

        Ok(principal)
    }
}
