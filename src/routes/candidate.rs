use crate::error::{Error, Result};
use crate::middleware::auth::{AuthIdentity, IdentityKind, TenantContext};
use crate::response;
use crate::services::candidate_service::CandidateService;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Staff view over the tenant's candidate pool.
pub async fn list_candidates(
    Extension(tenant): Extension<TenantContext>,
) -> Result<impl axum::response::IntoResponse> {
    let candidates = CandidateService::new(tenant.pool.clone()).list().await?;
    Ok(response::ok("Candidates", candidates))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub profile_data: JsonValue,
}

pub async fn update_profile(
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl axum::response::IntoResponse> {
    if identity.kind != IdentityKind::Candidate {
        return Err(Error::Forbidden(
            "Only candidates can update their profile".to_string(),
        ));
    }
    let profile = CandidateService::new(tenant.pool.clone())
        .update_profile_data(identity.id, &payload.profile_data)
        .await?;
    Ok(response::ok("Profile updated", profile))
}
