use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    pub job_id: Uuid,
    #[validate(length(max = 10000))]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    /// One of the lifecycle statuses, e.g. "under_review".
    pub status: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleInterviewRequest {
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(min = 1, max = 200))]
    pub interviewer: String,
    pub mode: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommunicationRequest {
    #[validate(length(min = 1, max = 10000))]
    pub message: String,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScreeningRequest {
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InterviewFeedbackRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 5000))]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}
