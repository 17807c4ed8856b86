use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{ReadsmithError, Result};
use super::super::logger::FileLogger;

/// A chat-completion backend capable of producing README section text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion with a system message and a user prompt.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;

    /// Provider name (e.g. "Zhipu", "Ollama")
    fn provider_name(&self) -> &str;

    /// Model name being used
    fn model_name(&self) -> &str;
}

const MAX_ATTEMPTS: u32 = 3;

/// Call the model with exponential backoff (1s, 2s between attempts).
/// Every successful interaction is recorded in the persistent log; failures
/// are logged and retried until the attempts run out.
pub async fn complete_with_retry(
    client: &dyn LlmClient,
    system: &str,
    prompt: &str,
    logger: &FileLogger,
) -> Result<String> {
    let mut last_error = None;
    for attempt in 0..MAX_ATTEMPTS {
        match client.complete(system, prompt).await {
            Ok(response) => {
                logger
                    .ai_interaction(
                        &format!("[System]\n{}\n\n[User]\n{}", system, prompt),
                        &response,
                        "AI_REQUEST",
                    )
                    .await;
                return Ok(response);
            }
            Err(err) => {
                warn!("AI call failed (attempt {}/{}): {}", attempt + 1, MAX_ATTEMPTS, err);
                logger.error(&err.to_string(), "AI call failed").await;
                last_error = Some(err);
                if attempt + 1 < MAX_ATTEMPTS {
                    tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
                }
            }
        }
    }
    Err(last_error.unwrap_or_else(|| ReadsmithError::Llm("all retry attempts failed".to_string())))
}
