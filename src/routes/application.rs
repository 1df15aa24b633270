use crate::domain::status::ApplicationStatus;
use crate::dto::application_dto::{
    ApplyRequest, CommunicationRequest, InterviewFeedbackRequest, ScheduleInterviewRequest,
    ScreeningRequest, UpdateStatusRequest, WithdrawRequest,
};
use crate::error::{Error, Result};
use crate::middleware::auth::{AuthIdentity, IdentityKind, TenantContext};
use crate::response;
use crate::services::application_service::ApplicationService;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

pub async fn apply(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Json(payload): Json<ApplyRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    if identity.kind != IdentityKind::Candidate {
        return Err(Error::Forbidden(
            "Only candidates can apply to jobs".to_string(),
        ));
    }

    let application = ApplicationService::new(tenant.pool.clone())
        .apply(
            payload.job_id,
            identity.id,
            &identity.actor(),
            payload.cover_letter.as_deref(),
        )
        .await?;

    {
        let mailer = state.mailer.clone();
        let to = identity.email.clone();
        let job_id = payload.job_id;
        tokio::spawn(async move {
            let _ = mailer
                .send(
                    &to,
                    "application_received",
                    json!({ "job_id": job_id }),
                )
                .await;
        });
    }

    Ok(response::created("Application submitted", application))
}

pub async fn my_applications(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
) -> Result<impl axum::response::IntoResponse> {
    let applications = ApplicationService::new(tenant.pool.clone())
        .list_for_candidate(identity.id)
        .await?;
    Ok(response::ok("Applications", applications))
}

pub async fn get_application(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let application = ApplicationService::new(tenant.pool.clone()).get(id).await?;
    // Candidates only see their own applications.
    if identity.kind == IdentityKind::Candidate && application.candidate_id != identity.id {
        return Err(Error::NotFound("Application not found".to_string()));
    }
    Ok(response::ok("Application", application))
}

pub async fn list_for_job(
    Extension(tenant): Extension<TenantContext>,
    Path(job_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let applications = ApplicationService::new(tenant.pool.clone())
        .list_for_job(job_id)
        .await?;
    Ok(response::ok("Applications", applications))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let new_status: ApplicationStatus = payload.status.parse()?;
    let service = ApplicationService::new(tenant.pool.clone());
    let application = service
        .update_status(id, new_status, &identity.actor(), payload.notes)
        .await?;

    // Notify the candidate out of band; delivery failures never fail the
    // request.
    let candidate_email: Option<String> =
        sqlx::query_scalar("SELECT email FROM candidates WHERE id = $1")
            .bind(application.candidate_id)
            .fetch_optional(&tenant.pool)
            .await?;
    if let Some(to) = candidate_email {
        let mailer = state.mailer.clone();
        let status = new_status.as_str();
        tokio::spawn(async move {
            let _ = mailer
                .send(&to, "application_status_changed", json!({ "status": status }))
                .await;
        });
    }

    Ok(response::ok("Status updated", application))
}

pub async fn schedule_interview(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleInterviewRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let application = ApplicationService::new(tenant.pool.clone())
        .schedule_interview(id, &payload, &identity.actor())
        .await?;
    Ok(response::created("Interview scheduled", application))
}

pub async fn add_communication(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommunicationRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let service = ApplicationService::new(tenant.pool.clone());
    if identity.kind == IdentityKind::Candidate {
        let application = service.get(id).await?;
        if application.candidate_id != identity.id {
            return Err(Error::NotFound("Application not found".to_string()));
        }
    }
    let application = service
        .add_communication(id, &identity.actor(), &payload.message, payload.channel)
        .await?;
    Ok(response::created("Communication logged", application))
}

pub async fn set_screening(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScreeningRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let application = ApplicationService::new(tenant.pool.clone())
        .set_screening(id, payload.score, payload.notes, &identity.actor())
        .await?;
    Ok(response::ok("Screening recorded", application))
}

pub async fn interview_feedback(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<InterviewFeedbackRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let application = ApplicationService::new(tenant.pool.clone())
        .record_interview_feedback(id, index, payload.rating, payload.comments, &identity.actor())
        .await?;
    Ok(response::ok("Feedback recorded", application))
}

pub async fn withdraw(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WithdrawRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    if identity.kind != IdentityKind::Candidate {
        return Err(Error::Forbidden(
            "Only candidates can withdraw their applications".to_string(),
        ));
    }
    let application = ApplicationService::new(tenant.pool.clone())
        .withdraw(id, identity.id, &identity.actor(), payload.notes)
        .await?;
    Ok(response::ok("Application withdrawn", application))
}
