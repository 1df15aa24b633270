use crate::domain::status::{
    check_application_allowed, interview_auto_status, transition, ApplicationStatus, TimelineEntry,
};
use crate::dto::application_dto::ScheduleInterviewRequest;
use crate::error::{Error, Result};
use crate::models::application::{
    Application, CommunicationEntry, Interview, InterviewFeedback, InterviewStatus, Screening,
};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

const APP_COLUMNS: &str = "id, job_id, candidate_id, status, cover_letter, timeline, \
                           interviews, communications, screening, created_at, updated_at";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an application after the precondition checks: job published
    /// and active, deadline in the future, no duplicate unless the job
    /// allows multiples. Increments the job's counter by exactly one.
    pub async fn apply(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
        actor: &str,
        cover_letter: Option<&str>,
    ) -> Result<Application> {
        let job = crate::services::job_service::JobService::new(self.pool.clone())
            .get(job_id)
            .await?;

        let prior: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE job_id = $1 AND candidate_id = $2",
        )
        .bind(job_id)
        .bind(candidate_id)
        .fetch_one(&self.pool)
        .await?;

        let now = Utc::now();
        check_application_allowed(&job, prior, now)?;

        let initial = TimelineEntry::initial(actor, now);
        let query = format!(
            r#"
            INSERT INTO applications (job_id, candidate_id, status, cover_letter, timeline)
            VALUES ($1, $2, 'submitted', $3, $4)
            RETURNING {}
            "#,
            APP_COLUMNS
        );

        // The row and the counter commit together or not at all; a failure
        // after the insert must not leave a half-applied application behind.
        let mut tx = self.pool.begin().await?;
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(job_id)
            .bind(candidate_id)
            .bind(cover_letter)
            .bind(json!([initial]))
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE jobs SET applications_count = applications_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(application_id = %application.id, job_id = %job_id, "application submitted");
        Ok(application)
    }

    pub async fn get(&self, id: Uuid) -> Result<Application> {
        let query = format!("SELECT {} FROM applications WHERE id = $1", APP_COLUMNS);
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }

    pub async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE candidate_id = $1 ORDER BY created_at DESC",
            APP_COLUMNS
        );
        let applications = sqlx::query_as::<_, Application>(&query)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(applications)
    }

    pub async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE job_id = $1 ORDER BY created_at DESC",
            APP_COLUMNS
        );
        let applications = sqlx::query_as::<_, Application>(&query)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(applications)
    }

    /// Status changes are permissive (any status to any status) but every
    /// change appends exactly one timeline entry. The timeline column is
    /// append-only; updates go through server-side JSONB concatenation.
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: ApplicationStatus,
        actor: &str,
        notes: Option<String>,
    ) -> Result<Application> {
        let current = self.current_status(id).await?;
        let entry = transition(current, new_status, actor, notes, Utc::now());

        let query = format!(
            r#"
            UPDATE applications
            SET status = $1, timeline = timeline || $2::jsonb, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            APP_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(new_status.as_str())
            .bind(serde_json::to_value(&entry)?)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(application_id = %id, from = %current, to = %new_status, "status updated");
        Ok(application)
    }

    /// Appends an interview sub-record plus a timeline entry. The parent
    /// status is promoted to interview_scheduled only from submitted or
    /// under_review; later statuses never regress.
    pub async fn schedule_interview(
        &self,
        id: Uuid,
        payload: &ScheduleInterviewRequest,
        actor: &str,
    ) -> Result<Application> {
        let current = self.current_status(id).await?;
        let now = Utc::now();

        let interview = Interview {
            id: Uuid::new_v4(),
            scheduled_at: payload.scheduled_at,
            interviewer: payload.interviewer.clone(),
            mode: payload.mode.clone(),
            location: payload.location.clone(),
            status: InterviewStatus::Scheduled,
            notes: payload.notes.clone(),
            feedback: None,
        };

        let status = interview_auto_status(current).unwrap_or(current);
        let entry = transition(
            current,
            status,
            actor,
            Some(format!(
                "Interview scheduled with {} for {}",
                interview.interviewer, interview.scheduled_at
            )),
            now,
        );

        let query = format!(
            r#"
            UPDATE applications
            SET status = $1,
                interviews = interviews || $2::jsonb,
                timeline = timeline || $3::jsonb,
                updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            APP_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(status.as_str())
            .bind(serde_json::to_value(&interview)?)
            .bind(serde_json::to_value(&entry)?)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(application)
    }

    /// Appends to the communication log; status never changes here.
    pub async fn add_communication(
        &self,
        id: Uuid,
        sender: &str,
        message: &str,
        channel: Option<String>,
    ) -> Result<Application> {
        let current = self.current_status(id).await?;
        let now = Utc::now();
        let comm = CommunicationEntry {
            sender: sender.to_string(),
            message: message.to_string(),
            channel,
            sent_at: now,
        };
        let entry = transition(
            current,
            current,
            sender,
            Some("Communication logged".to_string()),
            now,
        );

        let query = format!(
            r#"
            UPDATE applications
            SET communications = communications || $1::jsonb,
                timeline = timeline || $2::jsonb,
                updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            APP_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(serde_json::to_value(&comm)?)
            .bind(serde_json::to_value(&entry)?)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(application)
    }

    pub async fn set_screening(
        &self,
        id: Uuid,
        score: i32,
        notes: Option<String>,
        reviewed_by: &str,
    ) -> Result<Application> {
        let current = self.current_status(id).await?;
        let now = Utc::now();
        let screening = Screening {
            score,
            notes,
            reviewed_by: reviewed_by.to_string(),
            reviewed_at: now,
        };
        let entry = transition(
            current,
            current,
            reviewed_by,
            Some(format!("Screening scored {}", score)),
            now,
        );

        let query = format!(
            r#"
            UPDATE applications
            SET screening = $1, timeline = timeline || $2::jsonb, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            APP_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(serde_json::to_value(&screening)?)
            .bind(serde_json::to_value(&entry)?)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(application)
    }

    /// Attaches feedback to the interview at the given zero-based position.
    /// The interviews array is rewritten whole; the timeline still only
    /// receives an append.
    pub async fn record_interview_feedback(
        &self,
        id: Uuid,
        index: usize,
        rating: i32,
        comments: Option<String>,
        submitted_by: &str,
    ) -> Result<Application> {
        let application = self.get(id).await?;
        let mut interviews: Vec<Interview> =
            serde_json::from_value(application.interviews.clone())?;
        let interview = interviews
            .get_mut(index)
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;

        let now = Utc::now();
        interview.status = InterviewStatus::Completed;
        interview.feedback = Some(InterviewFeedback {
            rating,
            comments,
            submitted_by: submitted_by.to_string(),
            submitted_at: now,
        });

        let current: ApplicationStatus = application.status.parse()?;
        let entry = transition(
            current,
            current,
            submitted_by,
            Some(format!("Interview feedback recorded (rating {})", rating)),
            now,
        );

        let query = format!(
            r#"
            UPDATE applications
            SET interviews = $1, timeline = timeline || $2::jsonb, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            APP_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(serde_json::to_value(&interviews)?)
            .bind(serde_json::to_value(&entry)?)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(application)
    }

    /// Candidate-facing withdrawal: only the owning candidate, and only
    /// while the application is not already terminal.
    pub async fn withdraw(
        &self,
        id: Uuid,
        candidate_id: Uuid,
        actor: &str,
        notes: Option<String>,
    ) -> Result<Application> {
        let application = self.get(id).await?;
        if application.candidate_id != candidate_id {
            return Err(Error::Forbidden(
                "Application belongs to another candidate".to_string(),
            ));
        }
        let current: ApplicationStatus = application.status.parse()?;
        if current.is_terminal() {
            return Err(Error::BadRequest(format!(
                "Application is already {}",
                current
            )));
        }
        self.update_status(id, ApplicationStatus::Withdrawn, actor, notes)
            .await
    }

    async fn current_status(&self, id: Uuid) -> Result<ApplicationStatus> {
        let status: String = sqlx::query_scalar("SELECT status FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        status.parse()
    }
}
