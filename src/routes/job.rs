use crate::dto::job_dto::{CreateJobRequest, UpdateJobRequest};
use crate::error::Result;
use crate::middleware::auth::{AuthIdentity, TenantContext};
use crate::response;
use crate::services::job_service::JobService;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

pub async fn list_public_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl axum::response::IntoResponse> {
    let (_, pool) = super::tenant_pool(&state, &headers).await?;
    let jobs = JobService::new(pool).list_published().await?;
    Ok(response::ok("Jobs", jobs))
}

pub async fn get_public_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let (_, pool) = super::tenant_pool(&state, &headers).await?;
    let job = JobService::new(pool).get_published(id).await?;
    Ok(response::ok("Job", job))
}

pub async fn create_job(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let job = JobService::new(tenant.pool.clone())
        .create(&payload, identity.id)
        .await?;
    tracing::info!(job_id = %job.id, created_by = %identity.email, "job created");
    Ok(response::created("Job created", job))
}

pub async fn update_job(
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let job = JobService::new(tenant.pool.clone())
        .update(id, &payload)
        .await?;
    Ok(response::ok("Job updated", job))
}

pub async fn list_jobs(
    Extension(tenant): Extension<TenantContext>,
) -> Result<impl axum::response::IntoResponse> {
    let jobs = JobService::new(tenant.pool.clone()).list_all().await?;
    Ok(response::ok("Jobs", jobs))
}

pub async fn get_job(
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let job = JobService::new(tenant.pool.clone()).get(id).await?;
    Ok(response::ok("Job", job))
}
