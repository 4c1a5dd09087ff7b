use serde::Deserialize;

use crate::chat::history::{DEFAULT_HISTORY_LIMIT, DEFAULT_SYSTEM_PROMPT};
use crate::llm::models::ModelParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    GraphQl,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TransportConfig {
    pub use_graphql: bool,
    pub graphql_url: String,
    pub api_base_url: String,
    pub auth_token: Option<String>,
    /// Ask the HTTP endpoint for server-sent events. Ignored by GraphQL.
    pub stream: bool,
    pub timeout_secs: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            use_graphql: true,
            graphql_url: "http://localhost:8787/api/graphql".to_string(),
            api_base_url: "http://localhost:8787".to_string(),
            auth_token: None,
            stream: false,
            timeout_secs: None,
        }
    }
}

impl TransportConfig {
    pub fn kind(&self) -> TransportKind {
        if self.use_graphql {
            TransportKind::GraphQl
        } else {
            TransportKind::Http
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub max_history_messages: usize,
    pub system_prompt: String,
    pub greeting: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_messages: DEFAULT_HISTORY_LIMIT,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            greeting: Some("Hello! I'm your AI assistant. How can I help you today?".to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub transport: TransportConfig,
    pub model: ModelParams,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PARLEY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${PARLEY_TOKEN}
        app_config.transport.graphql_url = expand_env(&app_config.transport.graphql_url);
        app_config.transport.api_base_url = expand_env(&app_config.transport.api_base_url);
        if let Some(ref mut token) = app_config.transport.auth_token {
            *token = expand_env(token);
        }

        Ok(app_config)
    }
}

fn expand_env(val: &str) -> String {
    if val.starts_with("${") && val.ends_with('}') {
        let var_name = &val[2..val.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else {
        val.to_string()
    }
}
