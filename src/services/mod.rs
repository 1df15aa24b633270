pub mod application_service;
pub mod auth_service;
pub mod candidate_service;
pub mod email_service;
pub mod job_service;
pub mod media_service;
