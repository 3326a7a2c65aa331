//! Thin client for an OpenAI-compatible streaming chat-completions API.

use std::convert::Infallible;
use std::time::Duration;

use anyhow::{anyhow, Context as _, Result};
use axum::body::Bytes;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::config::ChatConfig;
use crate::storage::ChatMessageRow;

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    /// None = no upstream configured; callers fall back immediately.
    api_key: Option<String>,
}

fn build_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        // Generous overall timeout: covers the whole streamed response.
        .timeout(Duration::from_secs(120))
        .user_agent(format!("havend/{}", env!("CARGO_PKG_VERSION")))
        .build()?)
}

impl ChatClient {
    pub fn new(config: &ChatConfig, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            api_key,
        })
    }

    /// Stream one completion, forwarding each content delta to `tx` as it
    /// arrives. Returns the accumulated reply text.
    ///
    /// A closed `tx` (client disconnected) stops forwarding but the
    /// accumulated text is still returned so it can be persisted.
    pub async fn stream_completion(
        &self,
        system_prompt: &str,
        history: &[ChatMessageRow],
        user_message: &str,
        tx: &mpsc::Sender<Result<Bytes, Infallible>>,
    ) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("no chat API key configured"))?;

        let mut messages = vec![json!({ "role": "system", "content": system_prompt })];
        for row in history {
            let role = if row.message_type == "assistant" {
                "assistant"
            } else {
                "user"
            };
            messages.push(json!({ "role": role, "content": row.message_text }));
        }
        messages.push(json!({ "role": "user", "content": user_message }));

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "stream": true,
            }))
            .send()
            .await
            .context("chat completion request")?
            .error_for_status()
            .context("chat completion status")?;

        let mut stream = response.bytes_stream();
        let mut line_buf = String::new();
        let mut full = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("chat completion stream")?;
            line_buf.push_str(&String::from_utf8_lossy(&chunk));

            // SSE frames are newline-delimited; hold incomplete lines.
            while let Some(pos) = line_buf.find('\n') {
                let line = line_buf[..pos].trim().to_string();
                line_buf.drain(..=pos);

                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data == "[DONE]" {
                    return Ok(full);
                }
                let Ok(event) = serde_json::from_str::<Value>(data) else {
                    continue;
                };
                if let Some(delta) = event["choices"][0]["delta"]["content"].as_str() {
                    full.push_str(delta);
                    if tx
                        .send(Ok(Bytes::from(delta.as_bytes().to_vec())))
                        .await
                        .is_err()
                    {
                        // Receiver gone; drain nothing further.
                        return Ok(full);
                    }
                }
            }
        }

        Ok(full)
    }
}
