use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::llm::{
    models::{ChatInput, ChatMessage, ChatReply, ChatResponse, ModelParams},
    ChatTransport, LlmError,
};

pub const SEND_MESSAGE: &str = r#"mutation SendMessage($input: ChatInput!) {
  sendMessage(input: $input) {
    id
    object
    created
    model
    choices {
      index
      message {
        role
        content
      }
      finish_reason
    }
    usage {
      prompt_tokens
      completion_tokens
      total_tokens
    }
  }
}"#;

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<ErrorLocation>,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

impl GraphQlError {
    /// `message (at 3:5, path sendMessage.choices)`, omitting empty parts.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.locations.is_empty() {
            let at: Vec<String> = self
                .locations
                .iter()
                .map(|l| format!("{}:{}", l.line, l.column))
                .collect();
            parts.push(format!("at {}", at.join(", ")));
        }
        if !self.path.is_empty() {
            let path: Vec<String> = self
                .path
                .iter()
                .map(|p| match p {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            parts.push(format!("path {}", path.join(".")));
        }

        if parts.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, parts.join(", "))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageData {
    pub send_message: Option<ChatResponse>,
}

pub struct GraphQlTransport {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl GraphQlTransport {
    pub fn new(client: Client, endpoint: String, auth_token: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            auth_token: auth_token.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl ChatTransport for GraphQlTransport {
    fn name(&self) -> &str {
        "graphql"
    }

    async fn send(&self, messages: &[ChatMessage], params: &ModelParams) -> Result<ChatReply, LlmError> {
        let body = json!({
            "operationName": "SendMessage",
            "query": SEND_MESSAGE,
            "variables": { "input": ChatInput::new(messages, params) },
        });

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Transport(format!("GraphQL endpoint returned {}: {}", status, text)));
        }

        let envelope: GraphQlResponse<SendMessageData> = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let data = match envelope.data {
            Some(data) => {
                for err in &envelope.errors {
                    warn!("GraphQL reported a partial error: {}", err.describe());
                }
                data
            }
            None if !envelope.errors.is_empty() => {
                let messages: Vec<String> = envelope.errors.iter().map(GraphQlError::describe).collect();
                return Err(LlmError::Transport(messages.join("; ")));
            }
            None => return Err(LlmError::EmptyResponse),
        };

        let chat = data.send_message.ok_or(LlmError::EmptyResponse)?;
        let content = chat.first_content().ok_or(LlmError::EmptyResponse)?.to_string();

        Ok(ChatReply {
            content,
            model: chat.model,
            usage: chat.usage,
        })
    }
}
