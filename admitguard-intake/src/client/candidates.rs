//! Candidate creation and retrieval client

use admitguard_common::api::{
    CandidateListResponse, CandidateRecord, CandidateResponse, SubmissionResponse,
};
use admitguard_common::config::ServiceConfig;
use admitguard_common::fields::FormSnapshot;
use admitguard_common::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// Candidate creation, behind a trait so the submit path is testable
/// without a live service
#[async_trait]
pub trait CandidateGateway: Send + Sync {
    async fn create(&self, snapshot: &FormSnapshot) -> Result<SubmissionResponse>;
}

pub struct CandidateClient {
    http: reqwest::Client,
    base_url: String,
}

impl CandidateClient {
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

    /// List all submitted candidates
    pub async fn list(&self) -> Result<CandidateListResponse> {
        let url = format!("{}/api/candidates", self.base_url);
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

    /// Fetch a single candidate by id
    pub async fn fetch(&self, id: Uuid) -> Result<CandidateRecord> {
        let url = format!("{}/api/candidates/{}", self.base_url, id);
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

        let body: CandidateResponse =
            response.json().await.map_err(|e| Error::Parse(e.to_string()))?;
        Ok(body.candidate)
    }
}

#[async_trait]
impl CandidateGateway for CandidateClient {
    /// Submit a candidate. A 422 rejection still decodes into
    /// `SubmissionResponse` (`success: false` + per-field errors), so the
    /// caller distinguishes rejection from transport failure.
    async fn create(&self, snapshot: &FormSnapshot) -> Result<SubmissionResponse> {
        let url = format!("{}/api/candidates", self.base_url);

        tracing::info!("Submitting candidate");

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

        match serde_json::from_str::<SubmissionResponse>(&body) {
            Ok(result) => {
                if result.success {
                    tracing::info!(
                        exception_count = result.exception_count,
                        flagged_for_review = result.flagged_for_review,
                        "Candidate accepted"
                    );
                }
                Ok(result)
            }
            Err(_) if !status.is_success() => Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            }),
            Err(e) => Err(Error::Parse(e.to_string())),
        }
    }
}
