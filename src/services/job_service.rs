use crate::dto::job_dto::{CreateJobRequest, UpdateJobRequest};
use crate::error::{Error, Result};
use crate::models::job::JobPosting;
use sqlx::PgPool;
use uuid::Uuid;

const JOB_COLUMNS: &str = "id, title, description, department, location, status, is_active, \
                           deadline, allow_multiple_applications, applications_count, \
                           created_by, created_at, updated_at";

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: &CreateJobRequest, created_by: Uuid) -> Result<JobPosting> {
        let query = format!(
            r#"
            INSERT INTO jobs (title, description, department, location, status, deadline,
                              allow_multiple_applications, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, JobPosting>(&query)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(&payload.department)
            .bind(&payload.location)
            .bind(payload.status.as_deref().unwrap_or("draft"))
            .bind(payload.deadline)
            .bind(payload.allow_multiple_applications.unwrap_or(false))
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateJobRequest) -> Result<JobPosting> {
        let current = self.get(id).await?;
        let query = format!(
            r#"
            UPDATE jobs
            SET title = $1, description = $2, department = $3, location = $4, status = $5,
                deadline = $6, allow_multiple_applications = $7, is_active = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, JobPosting>(&query)
            .bind(payload.title.as_ref().unwrap_or(&current.title))
            .bind(payload.description.as_ref().or(current.description.as_ref()))
            .bind(payload.department.as_ref().or(current.department.as_ref()))
            .bind(payload.location.as_ref().or(current.location.as_ref()))
            .bind(payload.status.as_ref().unwrap_or(&current.status))
            .bind(payload.deadline.or(current.deadline))
            .bind(
                payload
                    .allow_multiple_applications
                    .unwrap_or(current.allow_multiple_applications),
            )
            .bind(payload.is_active.unwrap_or(current.is_active))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    pub async fn get(&self, id: Uuid) -> Result<JobPosting> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        sqlx::query_as::<_, JobPosting>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    /// Public view: published and active postings only.
    pub async fn get_published(&self, id: Uuid) -> Result<JobPosting> {
        let query = format!(
            "SELECT {} FROM jobs WHERE id = $1 AND status = 'published' AND is_active = TRUE",
            JOB_COLUMNS
        );
        sqlx::query_as::<_, JobPosting>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    pub async fn list_published(&self) -> Result<Vec<JobPosting>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE status = 'published' AND is_active = TRUE ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        let jobs = sqlx::query_as::<_, JobPosting>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    pub async fn list_all(&self) -> Result<Vec<JobPosting>> {
        let query = format!("SELECT {} FROM jobs ORDER BY created_at DESC", JOB_COLUMNS);
        let jobs = sqlx::query_as::<_, JobPosting>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }
}
