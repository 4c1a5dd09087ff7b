use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use crate::llm::{
    models::{ChatInput, ChatMessage, ChatReply, ChatResponse, ModelParams, StreamChunk},
    ChatTransport, LlmError,
};

/// Reply used when the backend answers 2xx but carries no content.
pub const FALLBACK_REPLY: &str = "Sorry, the AI service is temporarily unavailable.";

pub struct HttpTransport {
    client: Client,
    base_url: String,
    stream: bool,
}

impl HttpTransport {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            stream: false,
        }
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    async fn post_chat(&self, input: &ChatInput) -> Result<Response, LlmError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .header("Content-Type", "application/json")
            .json(input)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, messages: &[ChatMessage], params: &ModelParams) -> Result<ChatReply, LlmError> {
        let input = ChatInput::new(messages, params);
        let response = self.post_chat(&input).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let content = body.first_content().unwrap_or(FALLBACK_REPLY).to_string();
        let model = if body.model.is_empty() { params.model.clone() } else { body.model };

        Ok(ChatReply {
            content,
            model,
            usage: body.usage,
        })
    }

    async fn send_streaming(
        &self,
        messages: &[ChatMessage],
        params: &ModelParams,
        tx: Sender<String>,
    ) -> Result<ChatReply, LlmError> {
        if !self.stream {
            let reply = self.send(messages, params).await?;
            let _ = tx.send(reply.content.clone()).await;
            return Ok(reply);
        }

        let mut input = ChatInput::new(messages, params);
        input.stream = Some(true);
        let response = self.post_chat(&input).await?;

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut content = String::new();
        let mut model = params.model.clone();

        'read: while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| LlmError::Transport(e.to_string()))?;
            pending.extend_from_slice(&bytes);

            // Events may be split across network chunks; only consume whole lines.
            while let Some(end) = pending.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = pending.drain(..=end).collect();
                match parse_event(String::from_utf8_lossy(&line).trim()) {
                    Event::Skip => {}
                    Event::Done => break 'read,
                    Event::Chunk(event) => {
                        if !event.model.is_empty() {
                            model = event.model.clone();
                        }
                        forward_deltas(event, &mut content, &tx).await;
                    }
                }
            }
        }

        if let Event::Chunk(event) = parse_event(String::from_utf8_lossy(&pending).trim()) {
            forward_deltas(event, &mut content, &tx).await;
        }

        if content.is_empty() {
            content = FALLBACK_REPLY.to_string();
            let _ = tx.send(content.clone()).await;
        }

        Ok(ChatReply {
            content,
            model,
            usage: None,
        })
    }
}

async fn forward_deltas(event: StreamChunk, content: &mut String, tx: &Sender<String>) {
    for choice in event.choices {
        if let Some(delta) = choice.delta.content.filter(|d| !d.is_empty()) {
            content.push_str(&delta);
            let _ = tx.send(delta).await;
        }
    }
}

enum Event {
    Skip,
    Done,
    Chunk(StreamChunk),
}

fn parse_event(line: &str) -> Event {
    let Some(data) = line.strip_prefix("data:") else {
        return Event::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Event::Done;
    }
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => Event::Chunk(chunk),
        Err(e) => {
            warn!("Skipping malformed stream event: {}", e);
            debug!("Malformed event payload: {}", data);
            Event::Skip
        }
    }
}
