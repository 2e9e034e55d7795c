use crate::client::ChatMessage;

/// Role-tagged transcript sent to the model on every query.
///
/// The first message is the system prompt and is never replaced or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Drop everything after the first `len` messages, always keeping the system prompt.
    pub fn rollback_to(&mut self, len: usize) {
        self.messages.truncate(len.max(1));
    }
}
