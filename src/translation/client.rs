use async_trait::async_trait;
use futures_util::Stream;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use super::error::TranslateError;
use super::sse_parser::sse_to_text_stream;
use crate::config::Credentials;

/// A boxed stream of text chunks from a streaming completion.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, TranslateError>> + Send>>;

/// The model API seam used by the engine.
///
/// Every call carries exactly one user-role message and expects a single
/// free-text reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends `prompt` to `model` and returns the reply text, or `None` if the
    /// model produced no content.
    async fn complete(&self, model: &str, prompt: &str) -> Result<Option<String>, TranslateError>;

    /// Streaming variant of [`complete`](Self::complete).
    ///
    /// The default implementation yields the whole reply as one chunk.
    async fn complete_stream(&self, model: &str, prompt: &str) -> Result<TextStream, TranslateError> {
        let reply = self.complete(model, prompt).await?;
        Ok(Box::pin(futures_util::stream::iter(reply.map(Ok))))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Client for an OpenAI-compatible API bound to one set of credentials.
pub struct ModelClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ModelClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Builds a client from resolved credentials.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(credentials.base_url.clone(), credentials.api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }

    async fn post_chat(
        &self,
        model: &str,
        prompt: &str,
        stream: bool,
    ) -> Result<reqwest::Response, TranslateError> {
        let url = self.url("chat/completions");
        let body = ChatCompletionRequest {
            model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            stream,
        };

        tracing::debug!(%url, model, stream, "sending chat completion request");

        let response = self
            .authorize(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|source| TranslateError::Connect { url, source })?;

        ensure_success(response).await
    }

    /// Lists the model ids the endpoint offers.
    pub async fn list_models(&self) -> Result<Vec<String>, TranslateError> {
        let url = self.url("models");
        tracing::debug!(%url, "listing models");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| TranslateError::Connect { url, source })?;

        let list: ModelList = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(TranslateError::Decode)?;

        let mut ids: Vec<String> = list.data.into_iter().map(|m| m.id).collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl CompletionBackend for ModelClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<Option<String>, TranslateError> {
        let response: ChatCompletionResponse = self
            .post_chat(model, prompt, false)
            .await?
            .json()
            .await
            .map_err(TranslateError::Decode)?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }

    async fn complete_stream(&self, model: &str, prompt: &str) -> Result<TextStream, TranslateError> {
        let response = self.post_chat(model, prompt, true).await?;
        Ok(Box::pin(sse_to_text_stream(response.bytes_stream())))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TranslateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, "API request failed");
    Err(TranslateError::Api { status, body })
}
