use crate::error::Result;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};

/// Posts templated mail requests to an external gateway. Without a
/// configured gateway this degrades to a logged no-op; delivery failures
/// are logged and never retried inline.
#[derive(Clone)]
pub struct EmailService {
    client: Client,
    gateway_url: Option<String>,
}

impl EmailService {
    pub fn new(gateway_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            gateway_url,
        }
    }

    pub async fn send(&self, to: &str, template: &str, data: JsonValue) -> Result<()> {
        let Some(url) = &self.gateway_url else {
            tracing::info!(to, template, "mail gateway not configured, skipping send");
            return Ok(());
        };

        let payload = json!({
            "to": to,
            "template": template,
            "data": data,
        });

        match self.client.post(url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(to, template, "mail dispatched");
            }
            Ok(resp) => {
                tracing::warn!(to, template, status = %resp.status(), "mail gateway rejected request");
            }
            Err(e) => {
                tracing::warn!(to, template, "mail gateway unreachable: {}", e);
            }
        }
        Ok(())
    }
}
