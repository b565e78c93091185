//! Assistant chat view model.

use std::sync::Arc;

use agrovision_events::{Snapshot, SnapshotBus, SnapshotStream};
use agrovision_gateway::AssistantGateway;

use crate::error::ClientError;

/// Appended when the assistant returns no usable answer.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't understand that. Please try again.";
/// Reported when the assistant could not be reached.
pub const ASK_FAILED_MESSAGE: &str = "Error: Could not get a response from the AI.";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// Typed by the user.
    User,
    /// Returned by the assistant.
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author.
    pub role: ChatRole,
    /// Message text.
    pub text: String,
}

/// Published conversation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    /// Messages in the order they were added.
    pub messages: Vec<ChatMessage>,
    /// Whether a question is awaiting its answer.
    pub busy: bool,
    /// Failure notice from the last question.
    pub notice: Option<&'static str>,
}

/// What happened to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The question was blank and nothing was sent.
    Ignored,
    /// An answer (possibly the fallback) was appended.
    Answered(String),
    /// The request failed; no answer was appended.
    Failed(ClientError),
}

/// View model behind the assistant chat screen.
#[derive(Clone)]
pub struct AssistantChat {
    gateway: Arc<dyn AssistantGateway>,
    state: SnapshotBus<ChatState>,
}

impl AssistantChat {
    /// Empty conversation.
    #[must_use]
    pub fn new(gateway: Arc<dyn AssistantGateway>) -> Self {
        Self {
            gateway,
            state: SnapshotBus::default(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> Snapshot<ChatState> {
        self.state.snapshot()
    }

    /// Subscribe to conversation changes.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotStream<ChatState> {
        self.state.subscribe()
    }

    /// Send `question` and append the answer.
    pub async fn ask(&self, question: &str) -> ChatOutcome {
        let question = question.trim();
        if question.is_empty() {
            return ChatOutcome::Ignored;
        }
        self.state.publish(|state| {
            state.messages.push(ChatMessage {
                role: ChatRole::User,
                text: question.to_string(),
            });
            state.busy = true;
            state.notice = None;
        });

        match self.gateway.ask(question).await {
            Ok(answer) => {
                let text = answer
                    .response
                    .map(|response| response.trim().to_string())
                    .filter(|response| !response.is_empty())
                    .unwrap_or_else(|| FALLBACK_ANSWER.to_string());
                self.state.publish(|state| {
                    state.messages.push(ChatMessage {
                        role: ChatRole::Assistant,
                        text: text.clone(),
                    });
                    state.busy = false;
                });
                ChatOutcome::Answered(text)
            }
            Err(err) => {
                let error = ClientError::from(err);
                tracing::warn!(error = %error, "assistant request failed");
                self.state.publish(|state| {
                    state.busy = false;
                    state.notice = Some(ASK_FAILED_MESSAGE);
                });
                ChatOutcome::Failed(error)
            }
        }
    }
}
