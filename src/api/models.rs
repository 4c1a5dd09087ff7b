use serde::Deserialize;

use crate::llm::models::Usage;

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: Option<String>,
    pub service: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLogEntry {
    pub timestamp: String,
    pub model: String,
    pub messages_count: u32,
    pub tokens_used: Usage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(default)]
    pub recent_chats: Vec<ChatLogEntry>,
}
