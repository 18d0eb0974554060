//! Conversation buffer memory: completed user/assistant exchanges.
//!
//! Only the user input and the final reply of each turn are kept. Tool calls
//! and their results live in the per-turn scratchpad of the tool loop and are
//! dropped once the turn finishes.

use rig::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    pub role: Role,
    pub content: String,
}

impl MemoryEntry {
    pub fn to_message(&self) -> Message {
        match self.role {
            Role::User => Message::user(&self.content),
            Role::Assistant => Message::assistant(&self.content),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConversationMemory {
    entries: Vec<MemoryEntry>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished turn.
    pub fn save_turn(&mut self, input: &str, output: &str) {
        self.entries.push(MemoryEntry {
            role: Role::User,
            content: input.to_string(),
        });
        self.entries.push(MemoryEntry {
            role: Role::Assistant,
            content: output.to_string(),
        });
    }

    /// History as rig messages, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.entries.iter().map(MemoryEntry::to_message).collect()
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
