use chrono::{Duration, Utc};
use talentgate_backend::auth::password::{hash_password, verify_password};
use talentgate_backend::auth::token::{decode_token, issue_token, Claims};
use talentgate_backend::domain::login::{preflight, register_failure, AccountState, LoginPolicy};
use talentgate_backend::error::Error;
use talentgate_backend::middleware::auth::{resolve_binding, Binding, ModelKind};
use uuid::Uuid;

const SECRET: &str = "test_secret_key";

#[test]
fn issued_token_round_trips_with_tenant_and_kind() {
    let subject = Uuid::new_v4().to_string();
    let token = issue_token(&subject, Some("candidate"), None, Some("acme"), SECRET, 7).unwrap();

    let claims = decode_token(&token, SECRET).unwrap();
    assert_eq!(claims.sub, subject);
    assert_eq!(claims.kind.as_deref(), Some("candidate"));
    assert_eq!(claims.tenant.as_deref(), Some("acme"));
    assert!(claims.is_candidate());
    assert!(!claims.is_super_admin());
}

#[test]
fn tampered_and_wrong_secret_tokens_are_rejected() {
    let token = issue_token("someone", Some("candidate"), None, Some("acme"), SECRET, 7).unwrap();
    assert!(matches!(
        decode_token(&token, "other_secret"),
        Err(Error::InvalidToken)
    ));

    let mut tampered = token.clone();
    tampered.push('x');
    assert!(matches!(
        decode_token(&tampered, SECRET),
        Err(Error::InvalidToken)
    ));
}

#[test]
fn expired_token_is_rejected() {
    // A negative expiry puts exp in the past.
    let token = issue_token("someone", None, None, Some("acme"), SECRET, -1).unwrap();
    assert!(matches!(
        decode_token(&token, SECRET),
        Err(Error::InvalidToken)
    ));
}

#[test]
fn super_admin_token_binds_to_master_whatever_the_header_says() {
    let token = issue_token("root", None, Some("super_admin"), None, SECRET, 1).unwrap();
    let claims = decode_token(&token, SECRET).unwrap();
    assert_eq!(resolve_binding(&claims, Some("acme")).unwrap(), Binding::Master);
    assert_eq!(resolve_binding(&claims, None).unwrap(), Binding::Master);
}

#[test]
fn candidate_token_with_tenant_binds_to_that_tenant_candidate_model() {
    let token = issue_token("u1", Some("candidate"), None, Some("tenant-t"), SECRET, 1).unwrap();
    let claims = decode_token(&token, SECRET).unwrap();
    assert_eq!(
        resolve_binding(&claims, Some("other-tenant")).unwrap(),
        Binding::Tenant {
            key: "tenant-t".into(),
            kind: ModelKind::Candidate
        }
    );
}

#[test]
fn tenantless_token_falls_back_to_header_then_fails() {
    let claims = Claims {
        sub: "u1".into(),
        exp: (Utc::now().timestamp() + 600) as usize,
        role: None,
        kind: Some("staff".into()),
        tenant: None,
    };
    assert_eq!(
        resolve_binding(&claims, Some("globex")).unwrap(),
        Binding::Tenant {
            key: "globex".into(),
            kind: ModelKind::Staff
        }
    );
    assert!(matches!(resolve_binding(&claims, None), Err(Error::MissingTenant)));
}

#[test]
fn password_hash_verifies_and_rejects() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password("correct horse battery staple", &hash).unwrap());
    assert!(!verify_password("correct horse battery stapl", &hash).unwrap());
}

#[test]
fn five_failures_then_the_sixth_attempt_is_locked_out() {
    let policy = LoginPolicy {
        max_attempts: 5,
        lock_duration: Duration::minutes(30),
    };
    let now = Utc::now();
    let mut state = AccountState {
        is_active: true,
        login_attempts: 0,
        lock_until: None,
    };

    // Five wrong passwords: each one passes preflight (still a 401-class
    // credentials failure) and bumps the counter.
    for attempt in 1..=5 {
        assert!(preflight(&state, now).is_ok(), "attempt {attempt} preflight");
        let update = register_failure(&state, &policy, now);
        assert_eq!(update.login_attempts, attempt);
        state.login_attempts = update.login_attempts;
        state.lock_until = update.lock_until;
    }

    // Sixth request is refused before any password comparison.
    assert!(state.is_locked(now));
    assert!(matches!(preflight(&state, now), Err(Error::AccountLocked)));
    assert_eq!(
        Error::AccountLocked.status_code(),
        axum::http::StatusCode::LOCKED
    );
}

#[test]
fn lock_and_inactive_responses_stay_distinct() {
    assert_ne!(
        Error::AccountLocked.to_string(),
        Error::AccountInactive.to_string()
    );
    assert_eq!(Error::AccountLocked.code(), "account_locked");
    assert_eq!(Error::AccountInactive.code(), "account_inactive");
}

#[test]
fn credential_errors_do_not_reveal_whether_the_account_exists() {
    // Unknown email and wrong password share one error path.
    assert_eq!(Error::InvalidCredentials.code(), "invalid_credentials");
    assert_eq!(
        Error::InvalidCredentials.status_code(),
        axum::http::StatusCode::UNAUTHORIZED
    );
}
