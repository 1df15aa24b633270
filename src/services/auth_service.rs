use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{issue_token, CANDIDATE_KIND, STAFF_KIND, SUPER_ADMIN_ROLE};
use crate::domain::login::{preflight, register_failure, AccountState, LoginPolicy};
use crate::error::{Error, Result};
use crate::models::candidate::CandidateProfile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    is_active: bool,
    password_hash: String,
    login_attempts: i32,
    lock_until: Option<DateTime<Utc>>,
    role: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register_candidate(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password: &str,
    ) -> Result<CandidateProfile> {
        // Uniqueness is per tenant database; the unique index backs this up.
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM candidates WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(Error::BadRequest(
                "A candidate with this email address already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;

        let profile = sqlx::query_as::<_, CandidateProfile>(
            r#"
            INSERT INTO candidates (name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, resume_url, profile_data, is_active,
                      last_login_at, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn login_candidate(
        &self,
        email: &str,
        password: &str,
        tenant_key: &str,
    ) -> Result<TokenResponse> {
        let account = self.authenticate("candidates", email, password).await?;
        self.issue(&account.id.to_string(), Some(CANDIDATE_KIND), None, Some(tenant_key))
    }

    pub async fn login_staff(
        &self,
        email: &str,
        password: &str,
        tenant_key: &str,
    ) -> Result<TokenResponse> {
        let account = self.authenticate("users", email, password).await?;
        self.issue(
            &account.id.to_string(),
            Some(STAFF_KIND),
            account.role.as_deref(),
            Some(tenant_key),
        )
    }

    pub async fn login_super_admin(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let account = self.authenticate("super_admins", email, password).await?;
        self.issue(&account.id.to_string(), None, Some(SUPER_ADMIN_ROLE), None)
    }

    /// Shared password check with lockout accounting. Unknown email and
    /// wrong password are deliberately indistinguishable; lock and inactive
    /// states are reported distinctly, before any password comparison.
    async fn authenticate(&self, table: &str, email: &str, password: &str) -> Result<AccountRow> {
        let role_expr = if table == "users" { "role" } else { "NULL::text" };
        let query = format!(
            r#"SELECT id, is_active, password_hash, login_attempts, lock_until, {} AS role
               FROM {} WHERE email = $1"#,
            role_expr, table
        );
        let account = sqlx::query_as::<_, AccountRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        let now = Utc::now();
        let state = AccountState {
            is_active: account.is_active,
            login_attempts: account.login_attempts,
            lock_until: account.lock_until,
        };
        preflight(&state, now)?;

        let matched = verify_password(password, &account.password_hash)?;

        if !matched {
            let policy = LoginPolicy::from_config(crate::config::get_config());
            let update = register_failure(&state, &policy, now);
            let stmt = format!(
                "UPDATE {} SET login_attempts = $1, lock_until = $2, updated_at = NOW() WHERE id = $3",
                table
            );
            sqlx::query(&stmt)
                .bind(update.login_attempts)
                .bind(update.lock_until)
                .bind(account.id)
                .execute(&self.pool)
                .await?;
            if update.lock_until.is_some() {
                tracing::warn!(table, account_id = %account.id, "account locked after repeated failures");
            }
            return Err(Error::InvalidCredentials);
        }

        let stmt = if crate::domain::login::needs_reset(&state) {
            format!(
                "UPDATE {} SET login_attempts = 0, lock_until = NULL, last_login_at = NOW(), updated_at = NOW() WHERE id = $1",
                table
            )
        } else {
            format!(
                "UPDATE {} SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1",
                table
            )
        };
        sqlx::query(&stmt).bind(account.id).execute(&self.pool).await?;

        Ok(account)
    }

    fn issue(
        &self,
        subject: &str,
        kind: Option<&str>,
        role: Option<&str>,
        tenant: Option<&str>,
    ) -> Result<TokenResponse> {
        let config = crate::config::get_config();
        let token = issue_token(
            subject,
            kind,
            role,
            tenant,
            &config.jwt_secret,
            config.jwt_expiry_days,
        )?;
        Ok(TokenResponse {
            token,
            token_type: "Bearer",
            expires_at: Utc::now() + chrono::Duration::days(config.jwt_expiry_days),
        })
    }
}
