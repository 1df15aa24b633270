use crate::error::{Error, Result};
use crate::models::candidate::CandidateProfile;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, name, email, phone, resume_url, profile_data, is_active, \
                               last_login_at, created_at, updated_at";

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<CandidateProfile> {
        let query = format!("SELECT {} FROM candidates WHERE id = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, CandidateProfile>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))
    }

    pub async fn update_resume(&self, id: Uuid, resume_url: &str) -> Result<CandidateProfile> {
        let query = format!(
            "UPDATE candidates SET resume_url = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, CandidateProfile>(&query)
            .bind(resume_url)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))
    }

    pub async fn update_profile_data(
        &self,
        id: Uuid,
        profile_data: &JsonValue,
    ) -> Result<CandidateProfile> {
        let query = format!(
            "UPDATE candidates SET profile_data = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, CandidateProfile>(&query)
            .bind(profile_data)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<CandidateProfile>> {
        let query = format!(
            "SELECT {} FROM candidates ORDER BY created_at DESC",
            PROFILE_COLUMNS
        );
        let candidates = sqlx::query_as::<_, CandidateProfile>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(candidates)
    }
}
