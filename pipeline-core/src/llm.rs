//! The LLM Port (spec.md §4.3): the only place network I/O happens.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

/// `generate(systemPrompt, userPrompt, temperature, timeout) -> string`,
/// cooperatively cancellable via `token`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        timeout: Duration,
        token: &CancellationToken,
    ) -> Result<String, PipelineError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI-compatible chat-completions client. One concrete collaborator
/// implementation of `LlmClient`; any other provider's wire format is out
/// of scope per spec.md §1 and can be supplied as another `LlmClient` impl.
pub struct HttpLlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpLlmClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        timeout: Duration,
        token: &CancellationToken,
    ) -> Result<String, PipelineError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            temperature,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = tokio::select! {
            result = tokio::time::timeout(timeout, request.send()) => result,
            _ = token.cancelled() => {
                return Err(PipelineError::Cancelled("llm call cancelled".into()));
            }
        };

        let response = response
            .map_err(|_| PipelineError::LlmTimeout(timeout))?
            .map_err(|e| PipelineError::LlmUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::LlmUnavailable(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::LlmUnavailable(format!("malformed response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::LlmUnavailable("empty choices array".into()))
    }
}

/// Scripted fake for tests and `--mock` dry runs: returns queued responses
/// in order, one per call; an empty queue is `LlmUnavailable`.
pub struct MockLlm {
    responses: Mutex<VecDeque<String>>,
}

impl MockLlm {
    pub fn new(responses: impl IntoIterator<Item = String>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().expect("mock llm lock poisoned").len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _temperature: f32,
        _timeout: Duration,
        token: &CancellationToken,
    ) -> Result<String, PipelineError> {
        if token.is_cancelled() {
            return Err(PipelineError::Cancelled("llm call cancelled".into()));
        }
        self.responses
            .lock()
            .expect("mock llm lock poisoned")
            .pop_front()
            .ok_or_else(|| PipelineError::LlmUnavailable("mock llm exhausted its scripted responses".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_llm_returns_responses_in_order() {
        let mock = MockLlm::new(vec!["first".to_string(), "second".to_string()]);
        let token = CancellationToken::new();
        let first = mock
            .generate("sys", "user", 0.5, Duration::from_secs(1), &token)
            .await
            .unwrap();
        assert_eq!(first, "first");
        assert_eq!(mock.remaining(), 1);
    }

    #[tokio::test]
    async fn mock_llm_exhaustion_is_unavailable() {
        let mock = MockLlm::new(Vec::<String>::new());
        let token = CancellationToken::new();
        let err = mock
            .generate("sys", "user", 0.5, Duration::from_secs(1), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::LlmUnavailable(_)));
    }

    #[tokio::test]
    async fn mock_llm_respects_cancellation() {
        let mock = MockLlm::new(vec!["never seen".to_string()]);
        let token = CancellationToken::new();
        token.cancel();
        let err = mock
            .generate("sys", "user", 0.5, Duration::from_secs(1), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled(_)));
    }
}
