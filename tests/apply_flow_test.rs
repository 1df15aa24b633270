//! Apply flow against a live tenant database. Ignored by default; run with
//! TEST_TENANT_DATABASE_URL=postgres://... cargo test -- --ignored

use sqlx::postgres::PgPoolOptions;
use talentgate_backend::error::Error;
use talentgate_backend::services::application_service::ApplicationService;
use uuid::Uuid;

#[tokio::test]
#[ignore = "needs a Postgres database (set TEST_TENANT_DATABASE_URL)"]
async fn apply_commits_row_and_counter_together() {
    let url = std::env::var("TEST_TENANT_DATABASE_URL").expect("TEST_TENANT_DATABASE_URL");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("pool");
    sqlx::migrate!("./migrations/tenant")
        .run(&pool)
        .await
        .expect("migrations");

    let candidate_id: Uuid = sqlx::query_scalar(
        "INSERT INTO candidates (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind("Alice")
    .bind(format!("alice_{}@example.com", Uuid::new_v4()))
    .bind("$argon2id$placeholder")
    .fetch_one(&pool)
    .await
    .expect("seed candidate");

    let job_id: Uuid = sqlx::query_scalar(
        r#"INSERT INTO jobs (title, status, deadline)
           VALUES ($1, 'published', NOW() + INTERVAL '7 days') RETURNING id"#,
    )
    .bind("Backend Engineer")
    .fetch_one(&pool)
    .await
    .expect("seed job");

    let service = ApplicationService::new(pool.clone());

    let application = service
        .apply(job_id, candidate_id, "alice@example.com", None)
        .await
        .expect("apply");
    assert_eq!(application.status, "submitted");
    assert_eq!(application.timeline.as_array().map(Vec::len), Some(1));

    // The row and the counter moved together: exactly one of each.
    let counter: i32 = sqlx::query_scalar("SELECT applications_count FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(counter, 1);

    // Repeating the call is a duplicate and leaves both untouched.
    let err = service
        .apply(job_id, candidate_id, "alice@example.com", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateApplication));

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications WHERE job_id = $1 AND candidate_id = $2",
    )
    .bind(job_id)
    .bind(candidate_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);

    let counter: i32 = sqlx::query_scalar("SELECT applications_count FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(counter, 1);
}
