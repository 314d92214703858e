//! Audit log and dashboard client

use admitguard_common::api::{AuditEntry, AuditLogResponse, DashboardStats};
use admitguard_common::config::ServiceConfig;
use admitguard_common::{Error, Result};
use std::time::Duration;

pub struct AuditClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuditClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(super::validation::USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetch the full audit log, newest first (server ordering preserved)
    pub async fn fetch_log(&self) -> Result<Vec<AuditEntry>> {
        let url = format!("{}/api/audit-log", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status: status.as_u16(), message });
        }

        let body: AuditLogResponse =
            response.json().await.map_err(|e| Error::Parse(e.to_string()))?;

        tracing::debug!(entries = body.log.len(), "Fetched audit log");
        Ok(body.log)
    }

    /// Fetch submission statistics
    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let url = format!("{}/api/dashboard", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status: status.as_u16(), message });
        }

        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }
}
