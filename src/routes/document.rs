use crate::error::{Error, Result};
use crate::middleware::auth::{AuthIdentity, IdentityKind, TenantContext};
use crate::response;
use crate::services::candidate_service::CandidateService;
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    Extension,
};

/// Resume upload. The artifact is stored first; if the database write that
/// links it to the candidate fails, the stored file is deleted before the
/// error response (compensating cleanup, not a transaction).
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(identity): Extension<AuthIdentity>,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse> {
    if identity.kind != IdentityKind::Candidate {
        return Err(Error::Forbidden(
            "Only candidates can upload a resume".to_string(),
        ));
    }

    let mut stored = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("resume") {
            let filename = field.file_name().unwrap_or("resume.bin").to_string();
            let data = field.bytes().await?;
            if !data.is_empty() {
                stored = Some(state.media.store(&filename, &data).await?);
                break;
            }
        }
    }

    let Some(stored) = stored else {
        return Err(Error::BadRequest("No resume file provided".to_string()));
    };

    let profile = match CandidateService::new(tenant.pool.clone())
        .update_resume(identity.id, &stored.url)
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            let _ = state.media.delete(&stored.public_id).await;
            return Err(e);
        }
    };

    tracing::info!(candidate_id = %identity.id, url = %stored.url, "resume uploaded");
    Ok(response::created("Resume uploaded", profile))
}
