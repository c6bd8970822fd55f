use std::sync::Arc;
use std::time::Duration;

use log::{error, warn};
use tokio::time::timeout;

use crate::api::{ApiError, ChatBackend, ChatRequest, ChatResponse, ResponsePart};
use crate::location::LocationProvider;
use crate::models::chat::{ConversationSummary, Message};
use crate::models::doctor::format_doctor_list;

/// Preset symptom prompts offered as one-tap substitutes for typing.
pub const QUICK_ACTIONS: [&str; 6] = [
    "I have a headache",
    "I'm feeling nauseous",
    "I have chest pain",
    "I have a fever",
    "I have stomach pain",
    "Find doctors near me",
];

const RESET_COMMAND: &str = "reset";
const RESET_ACK: &str = "Session has been reset. How can I help you today?";
const OPENING_GREETING: &str = "Hello! I'm your AI health assistant. How can I help you today?";
const CLARIFY_FALLBACK: &str =
    "I'm here to help. Could you provide more details about your symptoms?";
const CONNECTION_FALLBACK: &str = "I'm having trouble connecting right now. Please try again.";
const SESSION_EXPIRED: &str = "Your session has expired. Please login again.";

/// Ceiling on the geolocation lookup. Past it the message goes out without
/// coordinates rather than keeping the user waiting.
const LOCATION_TIMEOUT: Duration = Duration::from_secs(3);

/// How a submission ended. `SessionExpired` is the signal to leave the chat
/// and re-authenticate; everything else keeps the session going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank draft or a reply still pending; nothing happened.
    Ignored,
    /// The exchange ran to completion, including surfaced failures.
    Completed,
    /// The reset command was intercepted locally.
    Reset,
    /// The backend rejected the token.
    SessionExpired,
}

/// Drives one chat session: holds the transcript, validates and submits
/// drafts, and folds backend replies back into the transcript.
pub struct ConversationController {
    backend: Arc<dyn ChatBackend>,
    location: Arc<dyn LocationProvider>,
    location_timeout: Duration,
    current_conversation: Option<String>,
    messages: Vec<Message>,
    draft: String,
    awaiting_reply: bool,
}

impl ConversationController {
    pub fn new(backend: Arc<dyn ChatBackend>, location: Arc<dyn LocationProvider>) -> Self {
        Self {
            backend,
            location,
            location_timeout: LOCATION_TIMEOUT,
            current_conversation: None,
            messages: Vec::new(),
            draft: String::new(),
            awaiting_reply: false,
        }
    }

    /// Overrides the geolocation ceiling. Tests shorten it.
    pub fn with_location_timeout(mut self, bound: Duration) -> Self {
        self.location_timeout = bound;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn current_conversation(&self) -> Option<&str> {
        self.current_conversation.as_deref()
    }

    /// Drops the transcript and starts over with an empty session.
    pub fn start_new_conversation(&mut self) {
        self.current_conversation = None;
        self.messages.clear();
    }

    /// Switches to a listed conversation, seeding the assistant greeting.
    pub fn open_conversation(&mut self, conversation: &ConversationSummary) {
        self.current_conversation = Some(conversation.id.clone());
        self.messages = vec![Message::assistant(OPENING_GREETING)];
    }

    /// Replaces the draft with a preset prompt and submits it immediately.
    pub async fn select_quick_action(&mut self, preset: &str) -> SubmitOutcome {
        self.set_draft(preset);
        self.submit().await
    }

    /// Submits `text` as if it had been typed into the draft.
    pub async fn submit_text(&mut self, text: impl Into<String>) -> SubmitOutcome {
        self.set_draft(text);
        self.submit().await
    }

    /// Runs the current draft through a full exchange. The raw draft lands in
    /// the transcript; the trimmed form is what travels. Failures never
    /// propagate out of here: each one becomes an assistant message, and the
    /// outcome tells the caller which kind of turn this was.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.awaiting_reply || self.draft.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let raw = std::mem::take(&mut self.draft);
        let trimmed = raw.trim().to_string();
        self.messages.push(Message::user(raw));
        self.awaiting_reply = true;

        if trimmed.to_lowercase() == RESET_COMMAND {
            self.messages.clear();
            self.messages.push(Message::assistant(RESET_ACK));
            self.awaiting_reply = false;
            return SubmitOutcome::Reset;
        }

        let coordinates = match timeout(self.location_timeout, self.location.locate()).await {
            Ok(found) => found,
            Err(_) => {
                warn!(
                    "Geolocation lookup exceeded {:?}; sending without coordinates",
                    self.location_timeout
                );
                None
            }
        };
        let request = ChatRequest {
            message: trimmed,
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        };

        let outcome = match self.backend.send_message(&request).await {
            Ok(reply) => self.append_reply(reply),
            Err(ApiError::Unauthorized) => {
                warn!("Chat request rejected with 401; session expired");
                self.messages.push(Message::assistant(SESSION_EXPIRED));
                SubmitOutcome::SessionExpired
            }
            Err(ApiError::Status {
                status,
                message: Some(message),
            }) => {
                warn!("Chat request failed with status {}: {}", status, message);
                self.messages.push(Message::assistant(message));
                SubmitOutcome::Completed
            }
            Err(err) => {
                error!("Chat request failed: {}", err);
                self.messages.push(Message::assistant(CONNECTION_FALLBACK));
                SubmitOutcome::Completed
            }
        };
        self.awaiting_reply = false;
        outcome
    }

    fn append_reply(&mut self, reply: ChatResponse) -> SubmitOutcome {
        match reply {
            ChatResponse {
                success: true,
                bot_response_parts: Some(parts),
                ..
            } => {
                for part in parts {
                    let text = match part {
                        ResponsePart::Text(content) => content,
                        ResponsePart::Doctors(doctors) => format_doctor_list(&doctors),
                    };
                    self.messages.push(Message::assistant(text));
                }
            }
            ChatResponse { message, .. } => {
                let text = message.unwrap_or_else(|| CLARIFY_FALLBACK.to_string());
                self.messages.push(Message::assistant(text));
            }
        }
        SubmitOutcome::Completed
    }
}
