use crate::auth::token::{decode_token, Claims};
use crate::error::Error;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Which identity model a request binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Candidate,
    Staff,
}

/// Outcome of the tenant/model resolution step, before any database work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Super admins bind to the master database; tenant headers are ignored.
    Master,
    Tenant { key: String, kind: ModelKind },
}

/// Pure resolution over decoded claims plus the header fallback. First match
/// wins: super_admin role, then claims.tenant, then the X-Tenant-Id header.
pub fn resolve_binding(claims: &Claims, header_tenant: Option<&str>) -> Result<Binding, Error> {
    if claims.is_super_admin() {
        return Ok(Binding::Master);
    }
    let key = claims
        .tenant
        .clone()
        .or_else(|| header_tenant.map(str::to_string))
        .ok_or(Error::MissingTenant)?;
    let kind = if claims.is_candidate() {
        ModelKind::Candidate
    } else {
        ModelKind::Staff
    };
    Ok(Binding::Tenant { key, kind })
}

/// Identity attached to the request after the gate passes. The credential
/// hash is never loaded here.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub kind: IdentityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    SuperAdmin,
    Staff,
    Candidate,
}

impl AuthIdentity {
    pub fn actor(&self) -> String {
        self.email.clone()
    }
}

/// Tenant context for downstream handlers: the resolved pool plus the key
/// used for scoping. Super-admin requests carry no key.
#[derive(Clone)]
pub struct TenantContext {
    pub tenant_key: Option<String>,
    pub pool: PgPool,
}

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: Uuid,
    name: String,
    email: String,
    is_active: bool,
}

/// The per-request gate: bearer decode, tenant/model resolution, identity
/// load and activity guard. A missing identity is reported as an invalid
/// token so deleted accounts and forged tokens are indistinguishable.
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Error::InvalidToken.into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Error::InvalidToken.into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Error::InvalidToken.into_response();
    };

    let config = crate::config::get_config();
    let claims = match decode_token(token, &config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let header_tenant = req
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let binding = match resolve_binding(&claims, header_tenant.as_deref()) {
        Ok(binding) => binding,
        Err(e) => return e.into_response(),
    };

    let Ok(subject_id) = claims.sub.parse::<Uuid>() else {
        return Error::InvalidToken.into_response();
    };

    let (tenant, identity) = match binding {
        Binding::Master => {
            let pool = state.registry.master();
            let identity =
                match load_identity(&pool, "super_admins", subject_id, IdentityKind::SuperAdmin)
                    .await
                {
                    Ok(identity) => identity,
                    Err(e) => return e.into_response(),
                };
            (
                TenantContext {
                    tenant_key: None,
                    pool,
                },
                identity,
            )
        }
        Binding::Tenant { key, kind } => {
            let pool = match state.registry.tenant_db(&key).await {
                Ok(pool) => pool,
                Err(e) => return e.into_response(),
            };
            let (table, identity_kind) = match kind {
                ModelKind::Candidate => ("candidates", IdentityKind::Candidate),
                ModelKind::Staff => ("users", IdentityKind::Staff),
            };
            let identity = match load_identity(&pool, table, subject_id, identity_kind).await {
                Ok(identity) => identity,
                Err(e) => return e.into_response(),
            };
            (
                TenantContext {
                    tenant_key: Some(key),
                    pool,
                },
                identity,
            )
        }
    };

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(tenant);
    req.extensions_mut().insert(identity);
    next.run(req).await
}

async fn load_identity(
    pool: &PgPool,
    table: &str,
    id: Uuid,
    kind: IdentityKind,
) -> Result<AuthIdentity, Error> {
    let query = format!(
        "SELECT id, name, email, is_active FROM {} WHERE id = $1",
        table
    );
    let row = sqlx::query_as::<_, IdentityRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::InvalidToken)?;

    if !row.is_active {
        return Err(Error::AccountInactive);
    }

    Ok(AuthIdentity {
        id: row.id,
        name: row.name,
        email: row.email,
        kind,
    })
}

/// Gate for staff-only routes; candidates get 403, not 401.
pub async fn require_staff(req: Request, next: Next) -> Response {
    match req.extensions().get::<AuthIdentity>() {
        Some(identity) if identity.kind != IdentityKind::Candidate => next.run(req).await,
        Some(_) => Error::Forbidden("Staff access required".to_string()).into_response(),
        None => Error::InvalidToken.into_response(),
    }
}
