pub mod graphql;
pub mod http;
pub mod models;

use graphql::GraphQlTransport;
use http::HttpTransport;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
use tracing::info;

use crate::config::{AppConfig, TransportKind};
use models::{ChatMessage, ChatReply, ModelParams};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No valid AI reply received")]
    EmptyResponse,
    #[error("Transport Error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, messages: &[ChatMessage], params: &ModelParams) -> Result<ChatReply, LlmError>;

    /// Forwards reply text through `tx` as it arrives. Transports without
    /// incremental delivery send the whole reply as a single chunk.
    async fn send_streaming(
        &self,
        messages: &[ChatMessage],
        params: &ModelParams,
        tx: Sender<String>,
    ) -> Result<ChatReply, LlmError> {
        let reply = self.send(messages, params).await?;
        let _ = tx.send(reply.content.clone()).await;
        Ok(reply)
    }
}

pub struct TransportFactory;

impl TransportFactory {
    /// Builds the transport selected by `transport.use_graphql`. The selection
    /// is fixed for the life of the client; a failing transport never falls
    /// back to the other one.
    pub fn create(config: &AppConfig, client: Client) -> Arc<dyn ChatTransport> {
        let transport = &config.transport;

        match transport.kind() {
            TransportKind::GraphQl => {
                info!("Using GraphQL transport at {}", transport.graphql_url);
                Arc::new(GraphQlTransport::new(
                    client,
                    transport.graphql_url.clone(),
                    transport.auth_token.clone(),
                ))
            }
            TransportKind::Http => {
                info!("Using HTTP transport at {}", transport.api_base_url);
                Arc::new(
                    HttpTransport::new(client, transport.api_base_url.clone())
                        .with_streaming(transport.stream),
                )
            }
        }
    }
}
