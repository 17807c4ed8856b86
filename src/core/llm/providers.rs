use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::config::{AiConfig, OllamaConfig, ZhipuConfig};
use crate::error::{ReadsmithError, Result};
use super::client::LlmClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const TEMPERATURE: f32 = 0.6;

/// Factory function to create the configured chat-completion client
pub fn create_client(config: &AiConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider.as_str() {
        "zhipu" => Ok(Box::new(ZhipuClient::new(&config.zhipu)?)),
        "ollama" => Ok(Box::new(OllamaClient::new(&config.ollama)?)),
        other => Err(ReadsmithError::Config(format!(
            "Unsupported AI provider: {}",
            other
        ))),
    }
}

/// Zhipu cloud provider, OpenAI-compatible endpoint
pub struct ZhipuClient {
    api_key: String,
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl ZhipuClient {
    pub fn new(config: &ZhipuConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ReadsmithError::Config("ZHIPU_API_KEY is required for the zhipu provider".to_string())
            })?;

        Ok(Self {
            api_key,
            endpoint: chat_completions_url(&config.base_url),
            model: config.model.clone(),
            client: build_http_client()?,
        })
    }
}

#[async_trait]
impl LlmClient for ZhipuClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        chat_completion(
            &self.client,
            &self.endpoint,
            Some(&self.api_key),
            &self.model,
            system,
            prompt,
        )
        .await
    }

    fn provider_name(&self) -> &str {
        "Zhipu"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Local Ollama provider through its OpenAI-compatible `/v1` surface
pub struct OllamaClient {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        Ok(Self {
            endpoint: format!("{}/v1/chat/completions", base),
            model: config.model.clone(),
            client: build_http_client()?,
        })
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        chat_completion(&self.client, &self.endpoint, None, &self.model, system, prompt).await
    }

    fn provider_name(&self) -> &str {
        "Ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ReadsmithError::Llm(format!("Failed to build HTTP client: {}", e)))
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

async fn chat_completion(
    client: &reqwest::Client,
    endpoint: &str,
    api_key: Option<&str>,
    model: &str,
    system: &str,
    prompt: &str,
) -> Result<String> {
    let payload = json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": prompt }
        ],
        "temperature": TEMPERATURE
    });

    let mut request = client.post(endpoint).json(&payload);
    if let Some(key) = api_key {
        request = request.header("Authorization", format!("Bearer {}", key));
    }

    let response = request
        .send()
        .await
        .map_err(|e| ReadsmithError::Llm(format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ReadsmithError::Llm(format!("API error {}: {}", status, body)));
    }

    let data: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ReadsmithError::Llm(format!("Failed to parse response: {}", e)))?;

    data["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ReadsmithError::Llm("No content in model response".to_string()))
}
