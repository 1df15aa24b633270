pub mod application;
pub mod auth;
pub mod candidate;
pub mod document;
pub mod health;
pub mod job;

use crate::error::{Error, Result};
use crate::middleware::auth::TENANT_HEADER;
use crate::AppState;
use axum::http::HeaderMap;
use sqlx::PgPool;

/// Tenant resolution for unauthenticated routes (registration, login,
/// public job listings): the X-Tenant-Id header is the only source.
pub async fn tenant_pool(state: &AppState, headers: &HeaderMap) -> Result<(String, PgPool)> {
    let key = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(Error::MissingTenant)?;
    let pool = state.registry.tenant_db(&key).await?;
    Ok((key, pool))
}
