use crate::error::{Error, Result};
use crate::models::job::JobPosting;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application lifecycle status. Selected, rejected and withdrawn are
/// terminal; everything else can still move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    Interviewed,
    Selected,
    Rejected,
    Withdrawn,
    OnHold,
}

impl ApplicationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Selected | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Interviewed => "interviewed",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::OnHold => "on_hold",
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "submitted" => Ok(ApplicationStatus::Submitted),
            "under_review" => Ok(ApplicationStatus::UnderReview),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "interview_scheduled" => Ok(ApplicationStatus::InterviewScheduled),
            "interviewed" => Ok(ApplicationStatus::Interviewed),
            "selected" => Ok(ApplicationStatus::Selected),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            "on_hold" => Ok(ApplicationStatus::OnHold),
            other => Err(Error::BadRequest(format!("Unknown status: {}", other))),
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the append-only audit trail embedded in an application.
/// Entries are only ever appended, never edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub previous_status: Option<ApplicationStatus>,
    pub new_status: ApplicationStatus,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TimelineEntry {
    pub fn initial(actor: &str, now: DateTime<Utc>) -> Self {
        Self {
            previous_status: None,
            new_status: ApplicationStatus::Submitted,
            actor: actor.to_string(),
            timestamp: now,
            notes: None,
        }
    }
}

/// Records a status change. Transitions are deliberately permissive (any
/// status to any status); the one hard guarantee is that every call yields
/// exactly one timeline entry with matching previous/new statuses.
pub fn transition(
    current: ApplicationStatus,
    requested: ApplicationStatus,
    actor: &str,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> TimelineEntry {
    TimelineEntry {
        previous_status: Some(current),
        new_status: requested,
        actor: actor.to_string(),
        timestamp: now,
        notes,
    }
}

/// Scheduling an interview promotes the application only from the two early
/// statuses; anything later keeps its status.
pub fn interview_auto_status(current: ApplicationStatus) -> Option<ApplicationStatus> {
    match current {
        ApplicationStatus::Submitted | ApplicationStatus::UnderReview => {
            Some(ApplicationStatus::InterviewScheduled)
        }
        _ => None,
    }
}

/// Preconditions for creating a new application against a job posting.
pub fn check_application_allowed(
    job: &JobPosting,
    prior_applications: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    if !job.is_active || job.status != "published" {
        return Err(Error::NotFound("Job not found".to_string()));
    }
    if let Some(deadline) = job.deadline {
        if deadline <= now {
            return Err(Error::DeadlinePassed);
        }
    }
    if prior_applications > 0 && !job.allow_multiple_applications {
        return Err(Error::DuplicateApplication);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn job(status: &str, deadline: Option<DateTime<Utc>>, allow_multiple: bool) -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            title: "Backend Engineer".into(),
            description: Some("Build things".into()),
            department: None,
            location: None,
            status: status.to_string(),
            is_active: true,
            deadline,
            allow_multiple_applications: allow_multiple,
            applications_count: 0,
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn transition_records_previous_and_new_status() {
        let now = Utc::now();
        let entry = transition(
            ApplicationStatus::Submitted,
            ApplicationStatus::Rejected,
            "hr@acme.test",
            Some("not a fit".into()),
            now,
        );
        assert_eq!(entry.previous_status, Some(ApplicationStatus::Submitted));
        assert_eq!(entry.new_status, ApplicationStatus::Rejected);
        assert_eq!(entry.timestamp, now);
        assert_eq!(entry.notes.as_deref(), Some("not a fit"));
    }

    #[test]
    fn any_transition_is_accepted() {
        let now = Utc::now();
        // Even a regression out of a terminal status produces an audit entry.
        let entry = transition(
            ApplicationStatus::Rejected,
            ApplicationStatus::UnderReview,
            "admin",
            None,
            now,
        );
        assert_eq!(entry.previous_status, Some(ApplicationStatus::Rejected));
        assert_eq!(entry.new_status, ApplicationStatus::UnderReview);
    }

    #[test]
    fn interview_promotes_only_from_early_statuses() {
        assert_eq!(
            interview_auto_status(ApplicationStatus::Submitted),
            Some(ApplicationStatus::InterviewScheduled)
        );
        assert_eq!(
            interview_auto_status(ApplicationStatus::UnderReview),
            Some(ApplicationStatus::InterviewScheduled)
        );
        assert_eq!(interview_auto_status(ApplicationStatus::Interviewed), None);
        assert_eq!(interview_auto_status(ApplicationStatus::Shortlisted), None);
        assert_eq!(interview_auto_status(ApplicationStatus::Withdrawn), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(ApplicationStatus::Selected.is_terminal());
        assert!(ApplicationStatus::Rejected.is_terminal());
        assert!(ApplicationStatus::Withdrawn.is_terminal());
        assert!(!ApplicationStatus::OnHold.is_terminal());
        assert!(!ApplicationStatus::InterviewScheduled.is_terminal());
    }

    #[test]
    fn apply_rejected_after_deadline() {
        let now = Utc::now();
        let j = job("published", Some(now - Duration::hours(1)), false);
        assert!(matches!(
            check_application_allowed(&j, 0, now),
            Err(Error::DeadlinePassed)
        ));
    }

    #[test]
    fn apply_rejected_on_duplicate_unless_job_allows_it() {
        let now = Utc::now();
        let strict = job("published", Some(now + Duration::days(7)), false);
        assert!(matches!(
            check_application_allowed(&strict, 1, now),
            Err(Error::DuplicateApplication)
        ));

        let lenient = job("published", Some(now + Duration::days(7)), true);
        assert!(check_application_allowed(&lenient, 3, now).is_ok());
    }

    #[test]
    fn apply_rejected_for_unpublished_job() {
        let now = Utc::now();
        let j = job("draft", None, false);
        assert!(matches!(
            check_application_allowed(&j, 0, now),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for s in [
            "submitted",
            "under_review",
            "shortlisted",
            "interview_scheduled",
            "interviewed",
            "selected",
            "rejected",
            "withdrawn",
            "on_hold",
        ] {
            let parsed: ApplicationStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("hired".parse::<ApplicationStatus>().is_err());
    }
}
