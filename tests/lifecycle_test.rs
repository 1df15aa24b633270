use chrono::{Duration, Utc};
use talentgate_backend::domain::status::{
    check_application_allowed, interview_auto_status, transition, ApplicationStatus, TimelineEntry,
};
use talentgate_backend::error::Error;
use talentgate_backend::models::job::JobPosting;
use uuid::Uuid;

fn published_job(allow_multiple: bool) -> JobPosting {
    JobPosting {
        id: Uuid::new_v4(),
        title: "Platform Engineer".into(),
        description: None,
        department: Some("Engineering".into()),
        location: None,
        status: "published".into(),
        is_active: true,
        deadline: Some(Utc::now() + Duration::days(14)),
        allow_multiple_applications: allow_multiple,
        applications_count: 0,
        created_by: None,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn first_application_passes_second_is_a_duplicate() {
    let job = published_job(false);
    let now = Utc::now();

    assert!(check_application_allowed(&job, 0, now).is_ok());
    let err = check_application_allowed(&job, 1, now).unwrap_err();
    assert!(matches!(err, Error::DuplicateApplication));
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[test]
fn duplicate_guard_respects_job_policy() {
    let job = published_job(true);
    assert!(check_application_allowed(&job, 2, Utc::now()).is_ok());
}

#[test]
fn expired_deadline_answers_gone() {
    let mut job = published_job(false);
    job.deadline = Some(Utc::now() - Duration::minutes(5));
    let err = check_application_allowed(&job, 0, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::DeadlinePassed));
    assert_eq!(err.status_code(), axum::http::StatusCode::GONE);
}

#[test]
fn unpublished_or_inactive_job_is_invisible() {
    let mut draft = published_job(false);
    draft.status = "draft".into();
    assert!(matches!(
        check_application_allowed(&draft, 0, Utc::now()),
        Err(Error::NotFound(_))
    ));

    let mut disabled = published_job(false);
    disabled.is_active = false;
    assert!(matches!(
        check_application_allowed(&disabled, 0, Utc::now()),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn every_status_change_yields_one_matching_timeline_entry() {
    let now = Utc::now();
    let walk = [
        (ApplicationStatus::Submitted, ApplicationStatus::UnderReview),
        (ApplicationStatus::UnderReview, ApplicationStatus::OnHold),
        (ApplicationStatus::OnHold, ApplicationStatus::Shortlisted),
        (ApplicationStatus::Shortlisted, ApplicationStatus::Selected),
    ];
    for (from, to) in walk {
        let entry = transition(from, to, "recruiter@tenant.test", None, now);
        assert_eq!(entry.previous_status, Some(from));
        assert_eq!(entry.new_status, to);
        assert_eq!(entry.actor, "recruiter@tenant.test");
    }
}

#[test]
fn scheduling_never_regresses_a_later_status() {
    assert_eq!(
        interview_auto_status(ApplicationStatus::Submitted),
        Some(ApplicationStatus::InterviewScheduled)
    );
    assert_eq!(
        interview_auto_status(ApplicationStatus::UnderReview),
        Some(ApplicationStatus::InterviewScheduled)
    );
    for later in [
        ApplicationStatus::Shortlisted,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::Interviewed,
        ApplicationStatus::Selected,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
        ApplicationStatus::OnHold,
    ] {
        assert_eq!(interview_auto_status(later), None, "regressed from {later}");
    }
}

#[test]
fn interview_on_interviewed_application_keeps_status_but_still_audits() {
    // The service applies interview_auto_status(current).unwrap_or(current);
    // mirror that composition here for the "interviewed" edge case.
    let current = ApplicationStatus::Interviewed;
    let status = interview_auto_status(current).unwrap_or(current);
    assert_eq!(status, ApplicationStatus::Interviewed);

    let entry = transition(current, status, "recruiter", Some("panel round".into()), Utc::now());
    assert_eq!(entry.previous_status, Some(ApplicationStatus::Interviewed));
    assert_eq!(entry.new_status, ApplicationStatus::Interviewed);
}

#[test]
fn timeline_entries_serialize_with_snake_case_statuses() {
    let entry = TimelineEntry::initial("a@x.com", Utc::now());
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["new_status"], "submitted");
    assert!(json["previous_status"].is_null());

    let entry = transition(
        ApplicationStatus::UnderReview,
        ApplicationStatus::InterviewScheduled,
        "hr",
        None,
        Utc::now(),
    );
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["previous_status"], "under_review");
    assert_eq!(json["new_status"], "interview_scheduled");
}
