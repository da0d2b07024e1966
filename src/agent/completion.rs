//! Completion client — turns (user text, context, tool result) into a reply.
//!
//! Backend failures never escape: they come back as [`Completion::Fallback`],
//! which still renders to a reply string the agent stores and returns. This
//! keeps "degraded but valid" distinguishable from internal faults without
//! inspecting strings.

use std::time::Duration;

use tracing::{debug, warn};

use crate::llm::{LlmProvider, ProviderError};

/// Outcome of one completion call.
#[derive(Debug)]
pub enum Completion {
    /// Text produced by the backend.
    Generated(String),
    /// The backend failed; the reply is a placeholder describing the error.
    Fallback(ProviderError),
}

impl Completion {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Completion::Fallback(_))
    }

    /// The reply text shown to the user and stored in memory.
    pub fn into_text(self) -> String {
        match self {
            Completion::Generated(text) => text,
            Completion::Fallback(e) => format!("Error generating response: {e}"),
        }
    }
}

/// System instruction for the backend.
///
/// With a tool result the model is told to answer from it; without one it is
/// framed as a free-form conversational assistant. Both embed `context`.
pub fn system_prompt(context: &str, tool_result: Option<&str>) -> String {
    match tool_result {
        Some(result) => format!(
            "You are a helpful AI assistant. You have access to factual information.\n\n\
             {context}\n\n\
             Tool search result: {result}\n\n\
             Based on the tool result above, provide a clear and helpful answer to the user's question."
        ),
        None => format!(
            "You are a helpful, friendly AI assistant. Engage in natural conversation.\n\n\
             {context}\n\n\
             Respond to the user in a conversational and helpful manner."
        ),
    }
}

#[derive(Debug, Clone)]
pub struct CompletionClient {
    provider: LlmProvider,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(provider: LlmProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub async fn complete(
        &self,
        user_text: &str,
        context: &str,
        tool_result: Option<&str>,
    ) -> Completion {
        let system = system_prompt(context, tool_result);
        debug!(
            provider = self.provider.name(),
            with_tool_result = tool_result.is_some(),
            system_len = system.len(),
            "requesting completion"
        );

        let outcome = match tokio::time::timeout(self.timeout, self.provider.complete(&system, user_text)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(text) => Completion::Generated(text),
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "completion failed — using fallback reply");
                Completion::Fallback(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::{dummy::DummyProvider, openai_compatible::OpenAiCompatibleProvider};

    fn dummy_client() -> CompletionClient {
        CompletionClient::new(LlmProvider::Dummy(DummyProvider), Duration::from_secs(5))
    }

    #[test]
    fn tool_prompt_embeds_context_and_result() {
        let p = system_prompt("No previous conversation.", Some("Found: JSON is a format"));
        assert!(p.starts_with("You are a helpful AI assistant. You have access to factual information."));
        assert!(p.contains("\n\nNo previous conversation.\n\n"));
        assert!(p.contains("Tool search result: Found: JSON is a format"));
        assert!(p.ends_with("provide a clear and helpful answer to the user's question."));
    }

    #[test]
    fn conversational_prompt_has_no_tool_section() {
        let p = system_prompt("Recent conversation:\nUser: hi\n", None);
        assert!(p.starts_with("You are a helpful, friendly AI assistant."));
        assert!(p.contains("User: hi"));
        assert!(!p.contains("Tool search result"));
        assert!(p.ends_with("Respond to the user in a conversational and helpful manner."));
    }

    #[tokio::test]
    async fn generated_reply_passes_through() {
        let c = dummy_client().complete("hello", "No previous conversation.", None).await;
        assert!(!c.is_fallback());
        assert_eq!(c.into_text(), "[echo] hello");
    }

    #[tokio::test]
    async fn backend_failure_becomes_fallback() {
        let provider = OpenAiCompatibleProvider::new(
            "http://127.0.0.1:9/v1/chat/completions".into(),
            "m".into(),
            0.7,
            500,
            2,
            "key".into(),
        )
        .unwrap();
        let client = CompletionClient::new(LlmProvider::OpenAiCompatible(provider), Duration::from_secs(5));
        let c = client.complete("hello", "ctx", None).await;
        assert!(c.is_fallback());
        assert!(c.into_text().starts_with("Error generating response: provider request failed"));
    }

    #[test]
    fn timeout_fallback_text() {
        let c = Completion::Fallback(ProviderError::Timeout(Duration::from_secs(60)));
        assert_eq!(c.into_text(), "Error generating response: provider request timed out after 60s");
    }

    #[tokio::test]
    async fn stalled_backend_times_out_into_fallback() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let provider = OpenAiCompatibleProvider::new(
            format!("http://{addr}/v1/chat/completions"),
            "m".into(),
            0.7,
            500,
            30,
            "key".into(),
        )
        .unwrap();
        let client = CompletionClient::new(LlmProvider::OpenAiCompatible(provider), Duration::from_millis(200));

        let c = client.complete("hello", "ctx", None).await;
        assert!(matches!(c, Completion::Fallback(ProviderError::Timeout(_))));
        let text = c.into_text();
        assert!(text.starts_with("Error generating response: "));
        assert!(text.contains("timed out after 200ms"));
    }
}
