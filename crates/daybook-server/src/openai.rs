use std::future::Future;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Seam to the text-completion service. The extraction adapters and the
/// summary generators are generic over this so tests can script the service.
pub trait Completion: Send + Sync {
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}

impl<C: Completion> Completion for &C {
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> impl Future<Output = anyhow::Result<String>> + Send {
        (**self).complete(system, user, temperature)
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    async fn chat(&self, messages: Vec<ChatMessage>, temperature: f32) -> anyhow::Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: &messages,
            temperature,
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("chat completion request")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("completion service error {status}: {body}");
        }

        let parsed: ChatCompletionResponse =
            resp.json().await.context("chat completion decode")?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("completion response has no choices")
    }
}

impl Completion for OpenAiClient {
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> impl Future<Output = anyhow::Result<String>> + Send {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: system.to_string(),
        }];
        if !user.trim().is_empty() {
            messages.push(ChatMessage {
                role: "user",
                content: user.to_string(),
            });
        }
        async move { self.chat(messages, temperature).await }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}
