use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// One candidate's submission to one job posting. The embedded collections
/// (timeline, interviews, communications) live as JSONB arrays and are only
/// ever appended to. Applications are never hard-deleted; withdrawn and
/// rejected are terminal statuses, not deletions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub status: String,
    pub cover_letter: Option<String>,
    pub timeline: JsonValue,
    pub interviews: JsonValue,
    pub communications: JsonValue,
    pub screening: Option<JsonValue>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

/// Interview sub-record; each is statused independently of its parent
/// application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub interviewer: String,
    pub mode: Option<String>,
    pub location: Option<String>,
    pub status: InterviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<InterviewFeedback>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewFeedback {
    /// 1..=5
    pub rating: i32,
    pub comments: Option<String>,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationEntry {
    pub sender: String,
    pub message: String,
    pub channel: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    /// 0..=100
    pub score: i32,
    pub notes: Option<String>,
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
}
