//! Admin session and candidate CRUD client
//!
//! Thin request/response wrappers with no state logic of their own; the
//! login session rides on the HTTP client's cookie store. `AdminPanel`
//! carries the one piece of UI state worth owning explicitly: the pending
//! delete target, set when the user asks to delete and cleared on
//! confirm/cancel.

use admitguard_common::api::{
    AdminActionResponse, AdminListResponse, AdminStatusResponse, AdminUpdateResponse,
    CandidateRecord, CandidateUpdate,
};
use admitguard_common::config::ServiceConfig;
use admitguard_common::{Error, Result};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdminClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        // Cookie store keeps the server session across calls
        let http = reqwest::Client::builder()
            .user_agent(super::validation::USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AdminActionResponse> {
        let url = format!("{}/api/admin/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        // 401 carries {success: false, error}; decode it either way
        let body: AdminActionResponse =
            response.json().await.map_err(|e| Error::Parse(e.to_string()))?;

        if body.success {
            tracing::info!(user = username, "Admin login succeeded");
        } else {
            tracing::warn!(user = username, "Admin login rejected");
        }
        Ok(body)
    }

    pub async fn logout(&self) -> Result<AdminActionResponse> {
        let url = format!("{}/api/admin/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }

    /// Session probe
    pub async fn status(&self) -> Result<AdminStatusResponse> {
        let url = format!("{}/api/admin/status", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }

    pub async fn list(&self) -> Result<AdminListResponse> {
        let url = format!("{}/api/admin/candidates", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(Error::Session("Not logged in".to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status: status.as_u16(), message });
        }
        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }

    pub async fn update(&self, id: Uuid, edit: &CandidateUpdate) -> Result<CandidateRecord> {
        let url = format!("{}/api/admin/candidates/{}", self.base_url, id);
        let response = self
            .http
            .put(&url)
            .json(edit)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(Error::Session("Not logged in".to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status: status.as_u16(), message });
        }

        let body: AdminUpdateResponse =
            response.json().await.map_err(|e| Error::Parse(e.to_string()))?;
        body.candidate
            .ok_or_else(|| Error::Parse("update response carried no candidate".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let url = format!("{}/api/admin/candidates/{}", self.base_url, id);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(Error::Session("Not logged in".to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status: status.as_u16(), message });
        }
        tracing::info!(candidate_id = %id, "Candidate deleted");
        Ok(())
    }
}

/// Admin panel state: the client plus the explicit pending-delete target
pub struct AdminPanel {
    client: AdminClient,
    pending_delete: Option<Uuid>,
}

impl AdminPanel {
    pub fn new(client: AdminClient) -> Self {
        Self { client, pending_delete: None }
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    /// Record which candidate a confirmation dialog is about
    pub fn request_delete(&mut self, id: Uuid) {
        self.pending_delete = Some(id);
    }

    pub fn pending_delete(&self) -> Option<Uuid> {
        self.pending_delete
    }

    /// Dialog dismissed without deleting
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Dialog confirmed: delete the pending target. The target is cleared
    /// whether or not the call succeeds — a retry needs a fresh request.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        let id = self
            .pending_delete
            .take()
            .ok_or_else(|| Error::Session("No delete pending".to_string()))?;
        self.client.delete(id).await
    }
}
