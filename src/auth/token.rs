use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const SUPER_ADMIN_ROLE: &str = "super_admin";
pub const CANDIDATE_KIND: &str = "candidate";
pub const STAFF_KIND: &str = "staff";

/// Decoded payload of an access token. Ephemeral, rebuilt on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

impl Claims {
    pub fn is_super_admin(&self) -> bool {
        self.role
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case(SUPER_ADMIN_ROLE))
            .unwrap_or(false)
    }

    pub fn is_candidate(&self) -> bool {
        self.kind
            .as_deref()
            .map(|k| k.eq_ignore_ascii_case(CANDIDATE_KIND))
            .unwrap_or(false)
    }
}

pub fn issue_token(
    subject: &str,
    kind: Option<&str>,
    role: Option<&str>,
    tenant: Option<&str>,
    secret: &str,
    expiry_days: i64,
) -> Result<String> {
    let exp = (Utc::now() + Duration::days(expiry_days)).timestamp() as usize;
    let claims = Claims {
        sub: subject.to_string(),
        exp,
        role: role.map(str::to_string),
        kind: kind.map(str::to_string),
        tenant: tenant.map(str::to_string),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| Error::Internal("Failed to sign token".to_string()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| Error::InvalidToken)
}
