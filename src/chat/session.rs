use std::sync::Arc;
use tokio::sync::mpsc::Sender as ChunkSender;
use tracing::{debug, error, info, warn};

use crate::chat::history::{build_outbound, IdGenerator, Message, Sender, DEFAULT_HISTORY_LIMIT, DEFAULT_SYSTEM_PROMPT};
use crate::config::AppConfig;
use crate::llm::{
    models::{ChatMessage, ChatReply, ModelParams},
    ChatTransport, LlmError,
};

/// Shown in place of a reply when the transport fails.
pub const APOLOGY_REPLY: &str = "Sorry, I ran into a technical problem. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// A request is already in flight; nothing changed.
    Busy,
    Replied(Message),
    FellBack { reply: Message, error: String },
}

/// A request that has been started with [`ChatSession::begin_send`] and not
/// yet settled.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub user_message: Message,
    pub outbound: Vec<ChatMessage>,
}

pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    params: ModelParams,
    system_prompt: String,
    history_limit: usize,
    messages: Vec<Message>,
    ids: IdGenerator,
    is_typing: bool,
    is_loading: bool,
    error: Option<String>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>, params: ModelParams) -> Self {
        Self {
            transport,
            params,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            messages: Vec::new(),
            ids: IdGenerator::new(),
            is_typing: false,
            is_loading: false,
            error: None,
        }
    }

    /// Configured session with an empty conversation.
    pub fn configured(config: &AppConfig, transport: Arc<dyn ChatTransport>) -> Self {
        Self::new(transport, config.model.clone())
            .with_system_prompt(config.chat.system_prompt.clone())
            .with_history_limit(config.chat.max_history_messages)
    }

    /// Configured session opening with `chat.greeting`, if one is set.
    pub fn from_config(config: &AppConfig, transport: Arc<dyn ChatTransport>) -> Self {
        let mut session = Self::configured(config, transport);

        if let Some(greeting) = &config.chat.greeting {
            let greeting = session.ids.message(Sender::Ai, greeting.clone());
            session.messages.push(greeting);
        }
        session
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_history(mut self, messages: Vec<Message>) -> Self {
        self.ids = IdGenerator::after(&messages);
        self.messages = messages;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> SessionState {
        if self.is_loading {
            SessionState::AwaitingResponse
        } else {
            SessionState::Idle
        }
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.error = None;
    }

    /// Idle -> AwaitingResponse. Appends the user message and returns the
    /// request to issue, or `None` for blank input or while another request
    /// is outstanding.
    pub fn begin_send(&mut self, content: &str) -> Option<PendingSend> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.state() == SessionState::AwaitingResponse {
            warn!("Rejecting send while a reply is still pending");
            return None;
        }

        // History for the request excludes the message being sent.
        let outbound = build_outbound(&self.messages, content, &self.system_prompt, self.history_limit);

        self.error = None;
        self.is_loading = true;

        let user_message = self.ids.message(Sender::User, trimmed);
        self.messages.push(user_message.clone());
        self.is_typing = true;

        debug!("Prepared {} outbound messages", outbound.len());
        Some(PendingSend { user_message, outbound })
    }

    /// AwaitingResponse -> Idle. Appends exactly one assistant message, the
    /// reply on success or the apology on failure.
    pub fn settle(&mut self, pending: PendingSend, result: Result<ChatReply, LlmError>) -> SendOutcome {
        self.is_typing = false;
        self.is_loading = false;

        match result {
            Ok(reply) => {
                if let Some(usage) = &reply.usage {
                    info!(
                        "Reply to {} from {} used {} tokens",
                        pending.user_message.id, reply.model, usage.total_tokens
                    );
                }
                let message = self.ids.message(Sender::Ai, reply.content);
                self.messages.push(message.clone());
                SendOutcome::Replied(message)
            }
            Err(e) => {
                error!("Failed to send message {}: {}", pending.user_message.id, e);
                let error = e.to_string();
                self.error = Some(error.clone());

                let reply = self.ids.message(Sender::Ai, APOLOGY_REPLY);
                self.messages.push(reply.clone());
                SendOutcome::FellBack { reply, error }
            }
        }
    }

    pub async fn send(&mut self, content: &str) -> SendOutcome {
        if content.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        let Some(pending) = self.begin_send(content) else {
            return SendOutcome::Busy;
        };

        let result = self.transport.send(&pending.outbound, &self.params).await;
        self.settle(pending, result)
    }

    /// Like [`send`](Self::send), forwarding reply text through `tx` as the
    /// transport delivers it.
    pub async fn send_streaming(&mut self, content: &str, tx: ChunkSender<String>) -> SendOutcome {
        if content.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        let Some(pending) = self.begin_send(content) else {
            return SendOutcome::Busy;
        };

        let result = self
            .transport
            .send_streaming(&pending.outbound, &self.params, tx)
            .await;
        self.settle(pending, result)
    }
}
