//! Chat controller
//!
//! Turns the three user actions (send, enter, reset) into log appends and
//! backend calls. Each action spawns at most one request; completions from
//! concurrent actions land in the log in whatever order they finish.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::state::{Message, Sender};
use crate::transport::{
    ChatRequest, ChatResponse, HttpOutcome, ResetResponse, Transport, TransportError,
};

pub const GREETING: &str = "Hello! What type of Lynk feature would you like to create (Metric, First-Last, Formula, or Field)? Or type 'reset' to start over.";
pub const RESETTING: &str = "Resetting conversation...";
pub const CHAT_NETWORK_ERROR: &str = "Network error or backend is down. Check the log.";
pub const RESET_NETWORK_ERROR: &str = "Network error during reset. Check the log.";

/// Where the controller puts messages
pub trait LogSink: Send + Sync {
    fn append(&self, message: Message);
}

impl LogSink for mpsc::UnboundedSender<Message> {
    fn append(&self, message: Message) {
        // Receiver gone means the UI is shutting down
        let _ = self.send(message);
    }
}

/// Named hooks a rendering surface binds its controls to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    Send,
    Reset,
    EnterKey,
}

/// Reachability of the backend, as last probed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online,
    Offline,
}

#[derive(Clone)]
pub struct ChatController {
    sink: Arc<dyn LogSink>,
    transport: Arc<dyn Transport>,
}

impl ChatController {
    pub fn new(sink: Arc<dyn LogSink>, transport: Arc<dyn Transport>) -> Self {
        Self { sink, transport }
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Post the greeting. Purely cosmetic, the backend is not contacted.
    pub fn activate(&self) {
        self.append_message(GREETING, Sender::Bot, false);
    }

    pub fn append_message(&self, text: impl Into<String>, sender: Sender, formatted: bool) {
        self.sink.append(Message::new(text, sender, formatted));
    }

    /// Route a surface event to its operation.
    pub fn dispatch(&self, event: ControllerEvent, input: &mut String) -> Option<JoinHandle<()>> {
        match event {
            ControllerEvent::Send | ControllerEvent::EnterKey => self.send_message(input),
            ControllerEvent::Reset => Some(self.reset_conversation()),
        }
    }

    /// Append the trimmed input as a user message, clear it, and post it to
    /// `/chat`. Blank input is ignored and left as is.
    pub fn send_message(&self, input: &mut String) -> Option<JoinHandle<()>> {
        let text = input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.append_message(text.clone(), Sender::User, false);
        input.clear();

        let sink = Arc::clone(&self.sink);
        let transport = Arc::clone(&self.transport);
        let request = ChatRequest::new(text);

        Some(tokio::spawn(async move {
            let outcome = transport.chat(&request).await;
            deliver_chat(sink.as_ref(), outcome);
        }))
    }

    /// Announce the reset immediately, then post to `/reset`.
    pub fn reset_conversation(&self) -> JoinHandle<()> {
        self.append_message(RESETTING, Sender::User, false);

        let sink = Arc::clone(&self.sink);
        let transport = Arc::clone(&self.transport);

        tokio::spawn(async move {
            let outcome = transport.reset().await;
            deliver_reset(sink.as_ref(), outcome);
        })
    }

    /// Probe `GET /` without touching the log.
    pub fn check_health(&self) -> JoinHandle<BackendStatus> {
        let transport = Arc::clone(&self.transport);

        tokio::spawn(async move {
            match transport.health().await {
                Ok(HttpOutcome::Success(report)) => {
                    info!(banner = %report.message, "backend reachable");
                    BackendStatus::Online
                }
                Ok(HttpOutcome::Rejected(rejection)) => {
                    info!(status = rejection.status, "backend health check rejected");
                    BackendStatus::Offline
                }
                Err(e) => {
                    info!(error = %e, "backend unreachable");
                    BackendStatus::Offline
                }
            }
        })
    }
}

fn deliver_chat(
    sink: &dyn LogSink,
    outcome: Result<HttpOutcome<ChatResponse>, TransportError>,
) {
    match outcome {
        Ok(HttpOutcome::Success(response)) => {
            if let Some(reply) = response.reply.filter(|r| !r.is_empty()) {
                sink.append(Message::bot(reply));
            }
            if let Some(yaml) = response.yaml.filter(|y| !y.is_empty()) {
                sink.append(Message::formatted_bot(yaml));
            }
        }
        Ok(HttpOutcome::Rejected(rejection)) => {
            sink.append(Message::bot(format!("Error: {}", rejection.describe())));
        }
        Err(e) => {
            error!(error = %e, "send message failed");
            sink.append(Message::bot(CHAT_NETWORK_ERROR));
        }
    }
}

fn deliver_reset(
    sink: &dyn LogSink,
    outcome: Result<HttpOutcome<ResetResponse>, TransportError>,
) {
    match outcome {
        Ok(HttpOutcome::Success(response)) => {
            sink.append(Message::bot(response.reply));
        }
        Ok(HttpOutcome::Rejected(rejection)) => {
            sink.append(Message::bot(format!("Error resetting: {}", rejection.status_text)));
        }
        Err(e) => {
            error!(error = %e, "reset failed");
            sink.append(Message::bot(RESET_NETWORK_ERROR));
        }
    }
}
