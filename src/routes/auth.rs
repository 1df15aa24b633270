use crate::dto::auth_dto::{LoginRequest, RegisterCandidateRequest};
use crate::error::Result;
use crate::middleware::auth::{AuthIdentity, IdentityKind, TenantContext};
use crate::response;
use crate::services::auth_service::AuthService;
use crate::services::candidate_service::CandidateService;
use crate::AppState;
use axum::{extract::State, http::HeaderMap, Extension, Json};
use serde::Serialize;
use serde_json::json;
use validator::Validate;

pub async fn register_candidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterCandidateRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let (tenant_key, pool) = super::tenant_pool(&state, &headers).await?;

    let profile = AuthService::new(pool)
        .register_candidate(
            &payload.name,
            &payload.email,
            payload.phone.as_deref(),
            &payload.password,
        )
        .await?;
    tracing::info!(tenant = %tenant_key, candidate_id = %profile.id, "candidate registered");

    {
        let mailer = state.mailer.clone();
        let to = profile.email.clone();
        let name = profile.name.clone();
        tokio::spawn(async move {
            let _ = mailer
                .send(&to, "candidate_welcome", json!({ "name": name }))
                .await;
        });
    }

    Ok(response::created("Registration successful", profile))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let (tenant_key, pool) = super::tenant_pool(&state, &headers).await?;
    let service = AuthService::new(pool);

    let token = match payload.user_type.as_deref() {
        Some("staff") => {
            service
                .login_staff(&payload.email, &payload.password, &tenant_key)
                .await?
        }
        _ => {
            service
                .login_candidate(&payload.email, &payload.password, &tenant_key)
                .await?
        }
    };
    Ok(response::ok("Login successful", token))
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let token = AuthService::new(state.registry.master())
        .login_super_admin(&payload.email, &payload.password)
        .await?;
    Ok(response::ok("Login successful", token))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MeProfile {
    Candidate(crate::models::candidate::CandidateProfile),
    Staff(crate::models::user::UserProfile),
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<MeProfile>,
}

pub async fn me(
    Extension(identity): Extension<AuthIdentity>,
    Extension(tenant): Extension<TenantContext>,
) -> Result<impl axum::response::IntoResponse> {
    let kind = match identity.kind {
        IdentityKind::SuperAdmin => "super_admin",
        IdentityKind::Staff => "staff",
        IdentityKind::Candidate => "candidate",
    };
    let profile = match identity.kind {
        IdentityKind::Candidate => Some(MeProfile::Candidate(
            CandidateService::new(tenant.pool.clone())
                .get_profile(identity.id)
                .await?,
        )),
        IdentityKind::Staff => sqlx::query_as::<_, crate::models::user::UserProfile>(
            "SELECT id, name, email, role, is_active, last_login_at, created_at FROM users WHERE id = $1",
        )
        .bind(identity.id)
        .fetch_optional(&tenant.pool)
        .await?
        .map(MeProfile::Staff),
        IdentityKind::SuperAdmin => None,
    };
    Ok(response::ok(
        "Identity",
        MeResponse {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            kind,
            tenant: tenant.tenant_key,
            profile,
        },
    ))
}
