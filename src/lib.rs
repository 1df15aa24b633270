pub mod auth;
pub mod config;
pub mod database;
pub mod domain;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;

use crate::database::registry::ConnectionManager;
use crate::services::{email_service::EmailService, media_service::MediaService};

#[derive(Clone)]
pub struct AppState {
    pub registry: ConnectionManager,
    pub media: MediaService,
    pub mailer: EmailService,
}

impl AppState {
    pub fn new(registry: ConnectionManager) -> Self {
        let config = crate::config::get_config();
        Self {
            registry,
            media: MediaService::new(config.uploads_dir.clone()),
            mailer: EmailService::new(config.mail_gateway_url.clone()),
        }
    }
}
