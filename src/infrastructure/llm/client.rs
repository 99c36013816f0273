use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::prompts::{system_prompt, Tense};

pub const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub amount: String,
}

/// Model reply plus the images of the contracts involved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub images: Vec<String>,
    pub title: String,
    pub purpose: String,
    pub explanation: String,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
            model: model.into(),
            api_key,
        })
    }

    /// Ask the model to explain `payload`, a serialized readable trace
    pub async fn explain<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        tense: Tense,
        images: Vec<String>,
    ) -> Result<Explanation> {
        let user_content = serde_json::to_string(payload)?;
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt(tense)},
                {"role": "user", "content": user_content},
            ],
        });

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("chat completion responded with status {status}: {text}");
        }

        let data: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion returned no content"))?;
        debug!(target: "tracelens::llm", len = content.len(), "model replied");

        let mut explanation = parse_reply(&content)?;
        explanation.images = images;
        Ok(explanation)
    }
}

/// Parse the model's JSON reply, tolerating a surrounding code fence
pub fn parse_reply(content: &str) -> Result<Explanation> {
    let body = content.trim();
    let body = body
        .strip_prefix("```json")
        .or_else(|| body.strip_prefix("```"))
        .unwrap_or(body);
    let body = body.trim_end().strip_suffix("```").unwrap_or(body);
    serde_json::from_str(body.trim()).context("model reply is not the expected JSON object")
}
