use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

/// Client for delivering replies through the Bot Framework connector.
#[derive(Clone)]
pub struct TeamsClient {
    http: reqwest::Client,
    app_id: String,
    app_password: String,
    /// Cached bearer token for connector API calls.
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

struct CachedToken {
    access_token: String,
    expires_at: i64, // unix epoch seconds
}

impl TeamsClient {
    pub fn new(http: reqwest::Client, app_id: String, app_password: String) -> Self {
        Self {
            http,
            app_id,
            app_password,
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Acquire (or reuse cached) bearer token from the Microsoft identity
    /// platform.
    async fn get_token(&self) -> anyhow::Result<String> {
        {
            let guard = self.cached_token.read().await;
            if let Some(cached) = guard.as_ref() {
                let now = chrono::Utc::now().timestamp();
                // Refresh 60s before expiry.
                if now < cached.expires_at - 60 {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let resp = self
            .http
            .post("https://login.microsoftonline.com/botframework.com/oauth2/v2.0/token")
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", &self.app_id),
                ("client_secret", &self.app_password),
                ("scope", "https://api.botframework.com/.default"),
            ])
            .send()
            .await
            .context("bot framework token request")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("bot framework token error {status}: {body}");
        }

        let token: TokenResponse = resp.json().await.context("parse token response")?;
        let expires_at = chrono::Utc::now().timestamp() + token.expires_in.unwrap_or(3600);
        let access_token = token.access_token.clone();

        let mut guard = self.cached_token.write().await;
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at,
        });

        Ok(access_token)
    }

    /// Send one reply into the conversation an activity arrived from.
    /// Threads onto the inbound activity when its id is known.
    pub async fn reply(
        &self,
        service_url: &str,
        conversation_id: &str,
        reply_to_id: Option<&str>,
        text: &str,
    ) -> anyhow::Result<()> {
        let token = self.get_token().await?;
        let base = service_url.trim_end_matches('/');
        let url = match reply_to_id {
            Some(activity_id) => format!(
                "{base}/v3/conversations/{conversation_id}/activities/{activity_id}"
            ),
            None => format!("{base}/v3/conversations/{conversation_id}/activities"),
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&reply_payload(text, reply_to_id))
            .send()
            .await
            .context("bot framework reply request")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("bot framework reply failed {status}: {body}");
        }
        Ok(())
    }
}

fn reply_payload(text: &str, reply_to_id: Option<&str>) -> Value {
    match reply_to_id {
        Some(id) => json!({ "type": "message", "text": text, "replyToId": id }),
        None => json!({ "type": "message", "text": text }),
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

// --- Webhook activity payload types ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String, // message | conversationUpdate | ...
    pub id: Option<String>,
    pub service_url: Option<String>,
    pub conversation: Option<Conversation>,
    pub from: Option<Account>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: Option<String>,
}
