use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{error, info};

use crate::api::models::{ChatLogEntry, HealthStatus, StatsResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

/// Client for the backend's auxiliary REST endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, endpoint))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get("/api/health").await
    }

    pub async fn stats(&self) -> Result<StatsResponse, ApiError> {
        self.get("/api/stats").await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Unknown,
    Healthy,
    Unhealthy,
}

/// Last known backend health.
pub struct HealthMonitor {
    api: ApiClient,
    status: Health,
    loading: bool,
    error: Option<String>,
}

impl HealthMonitor {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            status: Health::Unknown,
            loading: false,
            error: None,
        }
    }

    pub fn status(&self) -> Health {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn check(&mut self) -> Health {
        self.loading = true;
        self.error = None;

        self.status = match self.api.health().await {
            Ok(health) if health.status == "healthy" => Health::Healthy,
            Ok(health) => {
                info!("Backend reported status {:?}", health.status);
                Health::Unhealthy
            }
            Err(e) => {
                error!("Health check failed: {}", e);
                self.error = Some(e.to_string());
                Health::Unhealthy
            }
        };

        self.loading = false;
        self.status
    }
}

/// Recently served chats as reported by `/api/stats`.
pub struct ChatHistory {
    api: ApiClient,
    entries: Vec<ChatLogEntry>,
    loading: bool,
    error: Option<String>,
}

impl ChatHistory {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            entries: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn entries(&self) -> &[ChatLogEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the entries on success; keeps the previous ones on failure.
    pub async fn fetch(&mut self) -> &[ChatLogEntry] {
        self.loading = true;
        self.error = None;

        match self.api.stats().await {
            Ok(stats) => self.entries = stats.recent_chats,
            Err(e) => {
                error!("Failed to fetch chat history: {}", e);
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
        &self.entries
    }
}
