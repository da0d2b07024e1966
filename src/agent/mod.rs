//! Question-answer agent — decides between knowledge lookup and plain chat.
//!
//! One pass of [`Agent::process`]:
//!
//! ```text
//! context ← memory            (read before this turn is recorded)
//! factual? ── yes → extract key → knowledge lookup → tool_result
//!     │
//! completion(user, context, tool_result?)
//!     │
//! memory += user, assistant   (two appends, each under the lock)
//! ```
//!
//! The memory lock is never held across the completion await.

pub mod completion;
pub mod query;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::knowledge::KnowledgeStore;
use crate::memory::{MemoryError, Role, SharedMemory};

pub use completion::{Completion, CompletionClient};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Per-request answer, serialized as the `POST /chat` body.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub response: String,
    pub tool_used: bool,
    pub tool_result: Option<String>,
    pub is_factual: bool,
    pub message_count: usize,
    /// The backend failed and `response` is the fallback text.
    #[serde(skip)]
    pub degraded: bool,
}

/// Orchestrator. Cheap to clone; all clones share one memory window.
#[derive(Debug, Clone)]
pub struct Agent {
    knowledge: KnowledgeStore,
    memory: SharedMemory,
    completion: CompletionClient,
}

impl Agent {
    pub fn new(knowledge: KnowledgeStore, memory: SharedMemory, completion: CompletionClient) -> Self {
        Self { knowledge, memory, completion }
    }

    pub fn memory(&self) -> &SharedMemory {
        &self.memory
    }

    #[instrument(skip_all, fields(message_len = user_text.len()))]
    pub async fn process(&self, user_text: &str) -> Result<QueryResult, AgentError> {
        let context = self.memory.get_context()?;

        let is_factual = query::is_factual(user_text);
        let tool_result = if is_factual {
            let search_query = query::extract_search_query(user_text);
            let lookup = self.knowledge.lookup(&search_query);
            debug!(%search_query, found = lookup.is_found(), "knowledge lookup");
            Some(lookup.to_string())
        } else {
            None
        };

        let completion = self
            .completion
            .complete(user_text, &context, tool_result.as_deref())
            .await;
        let degraded = completion.is_fallback();
        let response = completion.into_text();

        self.memory.add(Role::User, user_text)?;
        self.memory.add(Role::Assistant, response.clone())?;
        let message_count = self.memory.count()?;

        info!(is_factual, tool_used = tool_result.is_some(), degraded, message_count, "query processed");

        Ok(QueryResult {
            response,
            tool_used: tool_result.is_some(),
            tool_result,
            is_factual,
            message_count,
            degraded,
        })
    }
}
