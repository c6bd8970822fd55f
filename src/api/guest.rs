use async_trait::async_trait;
use rand::seq::IndexedRandom;

use super::{ApiError, ChatBackend, ChatRequest, ChatResponse, ResponsePart};

/// General guidance served to sessions without a token. Every reply steers
/// the user toward creating an account.
const GUEST_REPLIES: [&str; 5] = [
    "I can help you with basic health information. For personalized advice and doctor recommendations, please sign up or log in.",
    "Based on your symptoms, I'd recommend consulting with a healthcare professional. Sign up to get personalized doctor recommendations in your area.",
    "I can provide general health guidance. For detailed analysis and local doctor suggestions, please create an account.",
    "That sounds concerning. While I can offer general advice, I'd strongly recommend seeing a doctor. Sign up to find qualified doctors near you.",
    "I understand your concern. For comprehensive health analysis and personalized recommendations, please create a free account.",
];

/// Offline stand-in for the chat backend used when no session token is
/// configured.
pub struct GuestChatBackend;

impl GuestChatBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GuestChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for GuestChatBackend {
    async fn send_message(&self, _request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let reply = GUEST_REPLIES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(GUEST_REPLIES[0]);
        Ok(ChatResponse {
            success: true,
            bot_response_parts: Some(vec![ResponsePart::Text(reply.to_string())]),
            message: None,
        })
    }
}
