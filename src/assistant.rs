// Room chat assistant
//
// Builds the hotel-facts prompt and frames the generator's answer. The
// generator itself (an LLM provider) sits behind `TextGenerator`.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::listing::NormalizedListing;

pub const HISTORY_TURNS: usize = 5;

pub const UNAVAILABLE_MESSAGE: &str = "I'm sorry, but the AI service is not available right now. Please make sure the API key is configured correctly.";
pub const FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error. Please try again or contact support.";

const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// What the assistant knows about the room being viewed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomContext {
    pub hotel_name: Option<String>,
    pub room_type: Option<String>,
    /// Nightly price in naira.
    pub price: Option<f64>,
    pub amenities: Vec<String>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub images: Vec<String>,
}

impl From<&NormalizedListing> for RoomContext {
    fn from(listing: &NormalizedListing) -> Self {
        let text = |s: &str| (!s.is_empty()).then(|| s.to_string());
        RoomContext {
            hotel_name: text(&listing.hotel_name),
            room_type: text(&listing.room.name),
            price: Some(listing.price),
            amenities: listing
                .amenities
                .labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
            location: text(&listing.location),
            rating: Some(listing.rating),
            description: text(&listing.description),
            images: listing.images.clone(),
        }
    }
}

fn text_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|s| !s.is_empty()).unwrap_or(fallback)
}

// Zero and NaN count as missing; negative values are kept
fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// System prompt with the room facts and the last few conversation turns.
pub fn build_system_prompt(context: &RoomContext, history: &[ChatMessage]) -> String {
    let price = truthy(context.price)
        .map(|p| format!("₦{p} per night"))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let rating = truthy(context.rating)
        .map(|r| format!("{r}/5 stars"))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let amenities = if context.amenities.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        context.amenities.join(", ")
    };

    let mut prompt = String::from(
        "You are a helpful hotel assistant AI. Help customers with questions about this specific room/hotel:\n\n",
    );
    prompt.push_str("Hotel Information:\n");
    // writing into a String cannot fail
    let _ = writeln!(prompt, "- Hotel Name: {}", text_or(&context.hotel_name, NOT_SPECIFIED));
    let _ = writeln!(prompt, "- Room Type: {}", text_or(&context.room_type, NOT_SPECIFIED));
    let _ = writeln!(prompt, "- Price: {price}");
    let _ = writeln!(prompt, "- Location: {}", text_or(&context.location, NOT_SPECIFIED));
    let _ = writeln!(prompt, "- Rating: {rating}");
    let _ = writeln!(prompt, "- Description: {}", text_or(&context.description, "Not available"));
    let _ = writeln!(prompt, "- Amenities: {amenities}");

    prompt.push_str("\nPrevious conversation:\n");
    let start = history.len().saturating_sub(HISTORY_TURNS);
    for message in &history[start..] {
        let _ = writeln!(prompt, "{}: {}", message.role, message.content);
    }

    prompt.push_str(
        "\nPlease provide a helpful, accurate response about this room/hotel. Be concise but informative.\n",
    );
    prompt
}

// Text generation backend (an LLM provider in production)
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    async fn generate(&self, system: &str, prompt: &str) -> anyhow::Result<String>;
}

pub struct Assistant {
    generator: Option<Arc<dyn TextGenerator>>,
    context: Option<RoomContext>,
}

impl Assistant {
    /// `generator` is `None` when no API key is configured.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, context: Option<RoomContext>) -> Self {
        Self { generator, context }
    }

    /// Connect a generator only when an API key is configured.
    pub fn from_config<F>(config: &ClientConfig, context: Option<RoomContext>, connect: F) -> Self
    where
        F: FnOnce(&str) -> Arc<dyn TextGenerator>,
    {
        let generator = config
            .assistant_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(connect);
        Self::new(generator, context)
    }

    pub fn context(&self) -> Option<&RoomContext> {
        self.context.as_ref()
    }

    pub fn greeting(&self) -> String {
        match &self.context {
            Some(context) => format!(
                "Hi! I'm here to help you with questions about {} and the {}. What would you like to know?",
                text_or(&context.hotel_name, "this hotel"),
                text_or(&context.room_type, "room"),
            ),
            None => "Hi! I'm here to help you with any hotel or travel questions. What would you like to know?"
                .to_string(),
        }
    }

    /// Answer `question`, given the conversation so far. Never fails: a
    /// missing or failing generator yields a fixed apology.
    pub async fn ask(&self, question: &str, history: &[ChatMessage]) -> String {
        let Some(generator) = &self.generator else {
            return UNAVAILABLE_MESSAGE.to_string();
        };

        let default_context = RoomContext::default();
        let context = self.context.as_ref().unwrap_or(&default_context);
        let system = build_system_prompt(context, history);
        debug!(history = history.len(), "asking assistant");

        match generator.generate(&system, question).await {
            Ok(answer) => match &self.context {
                Some(context) => format!(
                    "Based on the information about {}, here's what I can tell you about \"{question}\": {answer}",
                    text_or(&context.hotel_name, "this hotel"),
                ),
                None => format!("Here's what I can tell you about \"{question}\": {answer}"),
            },
            Err(e) => {
                error!(error = %e, "assistant generation failed");
                FAILURE_MESSAGE.to_string()
            }
        }
    }
}

/// A chat transcript that starts with the assistant's greeting.
pub struct Conversation {
    assistant: Assistant,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(assistant: Assistant) -> Self {
        let greeting = ChatMessage::assistant(assistant.greeting());
        Self {
            assistant,
            messages: vec![greeting],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send a user message and record the reply. Blank input is ignored.
    pub async fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }
        let reply = self.assistant.ask(input, &self.messages).await;
        self.messages.push(ChatMessage::user(input));
        self.messages.push(ChatMessage::assistant(reply));
        self.messages.last()
    }
}
