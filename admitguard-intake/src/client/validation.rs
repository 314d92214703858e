//! Remote validation client
//!
//! Wraps `POST /api/validate/{field}` and `POST /api/validate`. The rules
//! themselves live on the server; this client only normalizes responses
//! and classifies failures. The `ValidatorBackend` trait is the seam the
//! session talks through, so tests can substitute an in-process fake.

use admitguard_common::api::{FieldResult, FormValidationResult};
use admitguard_common::config::ServiceConfig;
use admitguard_common::fields::{FieldName, FieldVerdict, FormSnapshot};
use admitguard_common::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub(crate) const USER_AGENT: &str =
    concat!("AdmitGuard/", env!("CARGO_PKG_VERSION"), " (intake client)");

/// Validation operations the session depends on
#[async_trait]
pub trait ValidatorBackend: Send + Sync {
    /// Validate one field against the current form snapshot
    async fn validate_field(&self, field: FieldName, snapshot: &FormSnapshot)
        -> Result<FieldVerdict>;

    /// Validate the whole form, including cross-field rules the per-field
    /// calls never see
    async fn validate_form(&self, snapshot: &FormSnapshot) -> Result<FormValidationResult>;
}

/// HTTP implementation over the remote service
pub struct ValidationClient {
    http: reqwest::Client,
    base_url: String,
}

impl ValidationClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ValidatorBackend for ValidationClient {
    async fn validate_field(
        &self,
        field: FieldName,
        snapshot: &FormSnapshot,
    ) -> Result<FieldVerdict> {
        let url = format!("{}/api/validate/{}", self.base_url, field.as_str());

        tracing::debug!(field = %field, "Validating field");

        let response = self
            .http
            .post(&url)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        // The validator answers 200 with a verdict body even for invalid
        // values; a 4xx body still carries {valid, error} and is decoded
        // the same way.
        let result: FieldResult = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        result
            .into_verdict()
            .ok_or_else(|| Error::Parse(format!("response for {} carried no verdict", field)))
    }

    async fn validate_form(&self, snapshot: &FormSnapshot) -> Result<FormValidationResult> {
        let url = format!("{}/api/validate", self.base_url);

        tracing::debug!("Running full-form validation");

        let response = self
            .http
            .post(&url)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        match serde_json::from_str::<FormValidationResult>(&body) {
            Ok(result) if result.valid.is_some() => {
                tracing::debug!(
                    valid = result.valid,
                    hard_errors = result.errors.len(),
                    soft_errors = result.soft_errors.len(),
                    "Full-form validation complete"
                );
                Ok(result)
            }
            _ if !status.is_success() => Err(Error::Api {
                status: status.as_u16(),
                message: truncate(&body, 200),
            }),
            _ => Err(Error::Parse(
                "full-form response carried no verdict".to_string(),
            )),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
