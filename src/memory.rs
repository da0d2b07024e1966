//! Short-term conversation memory — a capped, chronological message log.
//!
//! [`ConversationMemory`] is the plain single-owner window. [`SharedMemory`]
//! is the process-wide handle: an `Arc<Mutex<_>>` so every append+trim and
//! every read is one critical section. The lock is synchronous and never held
//! across an `.await`.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Context returned when the window is empty.
pub const NO_HISTORY: &str = "No previous conversation.";
const CONTEXT_HEADER: &str = "Recent conversation:";

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("conversation memory lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("User"),
            Role::Assistant => f.write_str("Assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded message window. Oldest messages are dropped first.
#[derive(Debug)]
pub struct ConversationMemory {
    capacity: usize,
    messages: VecDeque<Message>,
}

impl ConversationMemory {
    /// `capacity` is clamped to at least one message.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, messages: VecDeque::with_capacity(capacity) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push_back(Message {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Render the window for the system prompt, one `Role: content` per line.
    pub fn get_context(&self) -> String {
        if self.messages.is_empty() {
            return NO_HISTORY.to_string();
        }
        let mut context = format!("{CONTEXT_HEADER}\n");
        for msg in &self.messages {
            context.push_str(&format!("{}: {}\n", msg.role, msg.content));
        }
        context
    }

    /// Content of the newest user message, or `""` if the window has none.
    pub fn get_last_user_message(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.messages.len()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Clonable handle to the one conversation window shared by the agent and
/// the HTTP layer. Constructed in `main` and injected; never global.
#[derive(Debug, Clone)]
pub struct SharedMemory {
    inner: Arc<Mutex<ConversationMemory>>,
}

impl SharedMemory {
    pub fn new(capacity: usize) -> Self {
        Self { inner: Arc::new(Mutex::new(ConversationMemory::new(capacity))) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ConversationMemory>, MemoryError> {
        self.inner.lock().map_err(|_| MemoryError::Poisoned)
    }

    pub fn add(&self, role: Role, content: impl Into<String>) -> Result<(), MemoryError> {
        self.lock()?.add(role, content);
        Ok(())
    }

    pub fn get_all(&self) -> Result<Vec<Message>, MemoryError> {
        Ok(self.lock()?.get_all())
    }

    pub fn get_context(&self) -> Result<String, MemoryError> {
        Ok(self.lock()?.get_context())
    }

    pub fn get_last_user_message(&self) -> Result<String, MemoryError> {
        Ok(self.lock()?.get_last_user_message())
    }

    pub fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.lock()?.count())
    }

    pub fn clear(&self) -> Result<(), MemoryError> {
        self.lock()?.clear();
        Ok(())
    }

    /// Messages, count and rendered context read under a single lock, so
    /// the three views always agree.
    pub fn snapshot(&self) -> Result<MemorySnapshot, MemoryError> {
        let guard = self.lock()?;
        Ok(MemorySnapshot {
            message_count: guard.count(),
            messages: guard.get_all(),
            context: guard.get_context(),
        })
    }
}

/// Point-in-time view of the window, shaped for `GET /memory`.
#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    pub message_count: usize,
    pub messages: Vec<Message>,
    pub context: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_count() {
        let mut memory = ConversationMemory::new(3);
        memory.add(Role::User, "Hello");
        memory.add(Role::Assistant, "Hi there!");
        assert_eq!(memory.count(), 2);
        assert_eq!(memory.get_last_user_message(), "Hello");
    }

    #[test]
    fn window_keeps_last_capacity_messages() {
        let mut memory = ConversationMemory::new(3);
        for i in 0..7 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            memory.add(role, format!("msg{i}"));
        }
        assert_eq!(memory.count(), 3);
        let contents: Vec<_> = memory.get_all().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["msg4", "msg5", "msg6"]);
    }

    #[test]
    fn capacity_one() {
        let mut memory = ConversationMemory::new(1);
        memory.add(Role::User, "question");
        memory.add(Role::Assistant, "answer");
        assert_eq!(memory.count(), 1);
        assert_eq!(memory.get_last_user_message(), "");
    }

    #[test]
    fn zero_capacity_clamped() {
        let mut memory = ConversationMemory::new(0);
        memory.add(Role::User, "a");
        assert_eq!(memory.capacity(), 1);
        assert_eq!(memory.count(), 1);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut memory = ConversationMemory::new(5);
        memory.add(Role::User, "a");
        memory.add(Role::Assistant, "b");
        memory.clear();
        assert_eq!(memory.count(), 0);
        assert_eq!(memory.capacity(), 5);
        assert_eq!(memory.get_context(), NO_HISTORY);
    }

    #[test]
    fn last_user_message_skips_assistant() {
        let mut memory = ConversationMemory::new(10);
        assert_eq!(memory.get_last_user_message(), "");
        memory.add(Role::User, "first");
        memory.add(Role::Assistant, "reply");
        memory.add(Role::User, "second");
        memory.add(Role::Assistant, "reply 2");
        assert_eq!(memory.get_last_user_message(), "second");
    }

    #[test]
    fn context_format() {
        let mut memory = ConversationMemory::new(5);
        memory.add(Role::User, "Hello, what is Python?");
        memory.add(Role::Assistant, "Python is a programming language.");
        assert_eq!(
            memory.get_context(),
            "Recent conversation:\nUser: Hello, what is Python?\nAssistant: Python is a programming language.\n"
        );
    }

    #[test]
    fn messages_are_chronological() {
        let mut memory = ConversationMemory::new(5);
        memory.add(Role::User, "a");
        memory.add(Role::Assistant, "b");
        let all = memory.get_all();
        assert!(all[0].timestamp <= all[1].timestamp);
    }

    #[test]
    fn role_serializes_lowercase() {
        let msg = Message { role: Role::Assistant, content: "x".into(), timestamp: Utc::now() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn shared_handles_see_same_window() {
        let memory = SharedMemory::new(2);
        let other = memory.clone();
        memory.add(Role::User, "one").unwrap();
        other.add(Role::Assistant, "two").unwrap();
        other.add(Role::User, "three").unwrap();
        assert_eq!(memory.count().unwrap(), 2);
        assert_eq!(memory.get_last_user_message().unwrap(), "three");

        let snap = memory.snapshot().unwrap();
        assert_eq!(snap.message_count, 2);
        assert_eq!(snap.messages[0].content, "two");
        assert!(snap.context.contains("User: three"));

        memory.clear().unwrap();
        assert_eq!(other.count().unwrap(), 0);
    }

    #[test]
    fn concurrent_appends_respect_capacity() {
        let memory = SharedMemory::new(10);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let m = memory.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        m.add(Role::User, format!("t{t}-{i}")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(memory.count().unwrap(), 10);
    }
}
