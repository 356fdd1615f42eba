//! HTTP client.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tara_config::ApiConfig;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{
    AgentDetail, AgentSummary, Analytics, CallLog, LoginRequest, LoginResponse, Tenant,
    Transaction, Wallet,
};

/// JSON client for the enterprise backend.
///
/// Every request carries `Authorization: Bearer <token>` once a token is set,
/// either from config or from a successful [`login`](Self::login).
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_body(status.as_u16(), &body);
            warn!(error = %err, "API request failed");
            return Err(err);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// GET `path` with optional query parameters.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        debug!(path, "GET");
        let request = self.client.get(self.url(path)).query(query);
        let response = self.authorize(request).send().await?;
        Self::read(response).await
    }

    /// POST a JSON body to `path`.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let request = self.client.post(self.url(path)).json(body);
        let response = self.authorize(request).send().await?;
        Self::read(response).await
    }

    /// Log in and keep the returned token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post_json("/api/auth/login", &request).await?;
        self.token = Some(response.access_token.clone());
        Ok(response)
    }

    pub async fn me(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/api/auth/me", &[]).await
    }

    pub async fn tenant(&self, tenant_id: &str) -> Result<Tenant, ApiError> {
        self.get_json(&format!("/api/tenants/{}", tenant_id), &[]).await
    }

    pub async fn tenant_agents(&self, tenant_id: &str) -> Result<Vec<AgentSummary>, ApiError> {
        self.get_json(&format!("/api/tenants/{}/agents", tenant_id), &[])
            .await
    }

    pub async fn agent(&self, agent_id: &str) -> Result<AgentDetail, ApiError> {
        self.get_json(&format!("/api/agents/{}", agent_id), &[]).await
    }

    pub async fn analytics(&self, agent_id: &str) -> Result<Analytics, ApiError> {
        self.get_json("/api/metrics/analytics", &[("agent_id", agent_id.to_string())])
            .await
    }

    pub async fn calls(&self, agent_id: &str, limit: u32) -> Result<Vec<CallLog>, ApiError> {
        self.get_json(
            "/api/metrics/calls",
            &[("agent_id", agent_id.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn wallet(&self, tenant_id: &str) -> Result<Wallet, ApiError> {
        self.get_json(&format!("/api/wallet/{}", tenant_id), &[]).await
    }

    pub async fn wallet_transactions(
        &self,
        tenant_id: &str,
        limit: u32,
    ) -> Result<Vec<Transaction>, ApiError> {
        self.get_json(
            &format!("/api/wallet/{}/transactions", tenant_id),
            &[("limit", limit.to_string())],
        )
        .await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
