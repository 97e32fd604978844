//! Chat transcript and its request guard.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::activity::logger;
use crate::api::{ApiError, Backend, ChatReply};

/// Shown in place of the raw error when a query fails.
pub const APOLOGY: &str =
    "Sorry, I couldn't process that question right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_context: Option<String>,
    /// Set on the canned apology that replaces a failed reply.
    pub error: bool,
}

impl ChatMessage {
    fn new(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now().to_rfc3339(),
            data_context: None,
            error: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    #[default]
    Idle,
    AwaitingResponse,
    /// The last reply failed. Accepts new input like `Idle`.
    Errored,
}

/// One conversation with the assistant.
///
/// The session id is generated once and sent with every query so the
/// service can correlate turns. At most one query is outstanding at a time.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    session_id: String,
    messages: Vec<ChatMessage>,
    phase: ChatPhase,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            phase: ChatPhase::Idle,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == ChatPhase::AwaitingResponse
    }

    /// Accept a user turn.
    ///
    /// Returns the trimmed query to send, or `None` when the input is blank or
    /// a reply is still outstanding. A rejected input changes nothing.
    pub fn begin(&mut self, input: &str) -> Option<String> {
        let query = input.trim();
        if query.is_empty() || self.is_awaiting() {
            return None;
        }
        self.messages
            .push(ChatMessage::new(Role::User, query.to_string()));
        self.phase = ChatPhase::AwaitingResponse;
        Some(query.to_string())
    }

    /// Append the assistant turn for the outstanding query.
    ///
    /// Ignored unless a query is outstanding, so each accepted user turn gets
    /// exactly one reply.
    pub fn resolve(&mut self, result: Result<ChatReply, ApiError>) -> Option<&ChatMessage> {
        if !self.is_awaiting() {
            return None;
        }
        let message = match result {
            Ok(reply) => {
                self.phase = ChatPhase::Idle;
                ChatMessage {
                    data_context: reply.data_context.filter(|c| !c.trim().is_empty()),
                    ..ChatMessage::new(Role::Assistant, reply.answer)
                }
            }
            Err(e) => {
                logger::error(&format!("chat query failed: {e}"));
                self.phase = ChatPhase::Errored;
                ChatMessage {
                    error: true,
                    ..ChatMessage::new(Role::Assistant, APOLOGY.to_string())
                }
            }
        };
        self.messages.push(message);
        self.messages.last()
    }

    /// `begin` then query the backend and `resolve`.
    pub fn submit<B: Backend + ?Sized>(&mut self, backend: &B, input: &str) -> Option<&ChatMessage> {
        let query = self.begin(input)?;
        let result = backend.chat(&query, &self.session_id);
        self.resolve(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(answer: &str) -> ChatReply {
        ChatReply {
            answer: answer.to_string(),
            data_context: Some("3 reports".to_string()),
        }
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = ChatSession::new();
        assert!(session.begin("").is_none());
        assert!(session.begin("  \n\t").is_none());
        assert!(session.messages().is_empty());
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn input_while_awaiting_is_ignored() {
        let mut session = ChatSession::new();
        assert_eq!(session.begin("  How many calls?  ").as_deref(), Some("How many calls?"));
        assert!(session.begin("second").is_none());
        assert_eq!(session.messages().len(), 1);
        assert!(session.is_awaiting());
    }

    #[test]
    fn resolve_appends_one_reply() {
        let mut session = ChatSession::new();
        session.begin("hi");
        let msg = session.resolve(Ok(reply("Hello"))).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.data_context.as_deref(), Some("3 reports"));
        assert_eq!(session.phase(), ChatPhase::Idle);
        assert!(session.resolve(Ok(reply("extra"))).is_none());
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn failure_appends_apology_and_accepts_next() {
        let mut session = ChatSession::new();
        session.begin("hi");
        let msg = session
            .resolve(Err(ApiError::Transport("connection refused".into())))
            .unwrap();
        assert!(msg.error);
        assert_eq!(msg.content, APOLOGY);
        assert_eq!(session.phase(), ChatPhase::Errored);
        assert!(session.begin("again").is_some());
    }

    #[test]
    fn session_id_is_stable_uuid() {
        let mut session = ChatSession::new();
        let id = session.session_id().to_string();
        assert!(Uuid::parse_str(&id).is_ok());
        session.begin("x");
        session.resolve(Ok(reply("y")));
        assert_eq!(session.session_id(), id);
        assert_ne!(ChatSession::new().session_id(), id);
    }
}
