//! Provider adapters
//!
//! The remote service speaks one of two API generations. Which one is
//! decided exactly once, at startup, by probing the `models` endpoint:
//! a server that answers it is current (`ModernProvider`), a server that
//! does not recognize it is running the older generation
//! (`LegacyProvider`). Callers only ever see the [`ProviderAdapter`]
//! trait; the variant never changes after startup.

mod legacy;
mod modern;

pub use legacy::LegacyProvider;
pub use modern::ModernProvider;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::fmt;

use crate::api::{
    summarize_error_body, ChatMessage, ChatRequest, ChatResponse, ImageRequest, ImageResponse,
    ModelsResponse,
};
use crate::core::message::Turn;

/// A generated image, in whichever form the active provider shape returns
/// it. The rendering boundary picks write-raw-bytes vs fetch-by-URL based
/// on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResult {
    Bytes(Vec<u8>),
    Url(String),
}

/// Any failure of a remote chat or image call. Never retried; the
/// interaction loop surfaces it and the session continues.
#[derive(Debug)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    Http(reqwest::Error),
    /// The provider answered with a non-success status.
    Api { status: StatusCode, detail: String },
    /// A 2xx response from which no usable payload could be extracted.
    MalformedResponse(String),
    /// Inline image data that was not valid base64.
    ImageDecode(base64::DecodeError),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Http(source) => write!(f, "Request failed: {source}"),
            ProviderError::Api { status, detail } => {
                write!(f, "API error ({status}): {detail}")
            }
            ProviderError::MalformedResponse(detail) => {
                write!(f, "Unexpected response shape: {detail}")
            }
            ProviderError::ImageDecode(source) => {
                write!(f, "Image data was not valid base64: {source}")
            }
        }
    }
}

impl StdError for ProviderError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ProviderError::Http(source) => Some(source),
            ProviderError::ImageDecode(source) => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(source: reqwest::Error) -> Self {
        ProviderError::Http(source)
    }
}

/// Uniform interface over the two provider generations. Adapters perform
/// the remote call and nothing else; session state is never touched here.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Short label for the active shape, used in logs.
    fn shape_name(&self) -> &'static str;

    /// Send the full accumulated history behind `system_prompt` and return
    /// the assistant's reply text.
    async fn complete_chat(
        &self,
        system_prompt: &str,
        history: &[Turn],
    ) -> Result<String, ProviderError>;

    /// Generate one image for `prompt`. Callers trim and reject blank
    /// prompts before calling.
    async fn generate_image(&self, prompt: &str) -> Result<ImageResult, ProviderError>;
}

pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

pub(crate) fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}

/// Connection parameters and request constants shared by both adapter
/// variants.
#[derive(Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
}

/// Request plumbing common to both shapes: bearer auth, JSON bodies, and
/// non-success statuses condensed into [`ProviderError::Api`].
pub(crate) struct HttpProviderCore {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl HttpProviderCore {
    pub(crate) fn new(client: reqwest::Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    pub(crate) fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    pub(crate) fn chat_messages(
        &self,
        system_prompt: &str,
        history: &[Turn],
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
        messages.extend(history.iter().map(|turn| ChatMessage {
            role: turn.speaker.as_str().to_string(),
            content: turn.text.clone(),
        }));
        messages
    }

    pub(crate) async fn post_chat(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatResponse, ProviderError> {
        let url = endpoint_url(&self.settings.base_url, "chat/completions");
        tracing::debug!(model = %request.model, messages = request.messages.len(), "chat request");
        self.post_json(&url, request).await
    }

    pub(crate) async fn post_images(
        &self,
        request: &ImageRequest,
    ) -> Result<ImageResponse, ProviderError> {
        let url = endpoint_url(&self.settings.base_url, "images/generations");
        tracing::debug!(model = %request.model, size = %request.size, "image request");
        self.post_json(&url, request).await
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, ProviderError>
    where
        B: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status,
                detail: summarize_error_body(&body),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::MalformedResponse(format!("could not parse response: {e}"))
        })
    }
}

/// Which API generation the endpoint serves. Selected once by
/// [`detect_provider`]; there is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderShape {
    Legacy,
    Modern,
}

/// How a probe response maps to a shape. `None` means the probe itself
/// failed and startup must abort.
pub(crate) fn classify_probe_status(status: StatusCode) -> Option<ProviderShape> {
    if status.is_success() {
        return Some(ProviderShape::Modern);
    }
    match status {
        // Older gateways predate the models listing entirely.
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::GONE => {
            Some(ProviderShape::Legacy)
        }
        _ => None,
    }
}

/// The startup capability probe could not decide a shape. Fatal: the
/// process must not serve any interaction.
#[derive(Debug)]
pub struct ProbeError {
    message: String,
    source: Option<reqwest::Error>,
}

impl ProbeError {
    fn transport(url: &str, source: reqwest::Error) -> Self {
        Self {
            message: format!("Could not reach {url}: {source}"),
            source: Some(source),
        }
    }

    fn unexpected_status(url: &str, status: StatusCode, detail: String) -> Self {
        Self {
            message: format!("Probe of {url} failed with status {status}: {detail}"),
            source: None,
        }
    }

    pub fn quick_fixes(&self) -> Vec<&'static str> {
        vec![
            "Check that OPENAI_BASE_URL points at an OpenAI-compatible endpoint",
            "Verify your API key is valid for this endpoint",
        ]
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for ProbeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn StdError + 'static))
    }
}

/// Probe the endpoint's models listing and construct the matching adapter.
/// Runs exactly once at startup.
pub async fn detect_provider(
    client: reqwest::Client,
    settings: ProviderSettings,
) -> Result<Box<dyn ProviderAdapter>, ProbeError> {
    let url = endpoint_url(&settings.base_url, "models");

    let response = client
        .get(&url)
        .header("Authorization", format!("Bearer {}", settings.api_key))
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|e| ProbeError::transport(&url, e))?;

    let status = response.status();
    let shape = match classify_probe_status(status) {
        Some(shape) => shape,
        None => {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::unexpected_status(
                &url,
                status,
                summarize_error_body(&body),
            ));
        }
    };

    if shape == ProviderShape::Modern {
        // The listing is informational; a body we cannot parse does not
        // demote the endpoint.
        match response.json::<ModelsResponse>().await {
            Ok(models) => tracing::debug!(models = models.data.len(), "probe: modern endpoint"),
            Err(e) => tracing::debug!(error = %e, "probe: modern endpoint, unparseable listing"),
        }
    } else {
        tracing::debug!(%status, "probe: legacy endpoint");
    }

    let core = HttpProviderCore::new(client, settings);
    Ok(match shape {
        ProviderShape::Modern => Box::new(ModernProvider::new(core)),
        ProviderShape::Legacy => Box::new(LegacyProvider::new(core)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Turn;

    #[test]
    fn probe_status_classification() {
        assert_eq!(
            classify_probe_status(StatusCode::OK),
            Some(ProviderShape::Modern)
        );
        assert_eq!(
            classify_probe_status(StatusCode::NOT_FOUND),
            Some(ProviderShape::Legacy)
        );
        assert_eq!(
            classify_probe_status(StatusCode::METHOD_NOT_ALLOWED),
            Some(ProviderShape::Legacy)
        );
        assert_eq!(
            classify_probe_status(StatusCode::GONE),
            Some(ProviderShape::Legacy)
        );
        assert_eq!(classify_probe_status(StatusCode::UNAUTHORIZED), None);
        assert_eq!(classify_probe_status(StatusCode::INTERNAL_SERVER_ERROR), None);
    }

    #[test]
    fn endpoint_urls_never_double_slash() {
        assert_eq!(
            endpoint_url("https://api.example.com/v1", "chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint_url("https://api.example.com/v1/", "/models"),
            "https://api.example.com/v1/models"
        );
        assert_eq!(normalize_base_url("https://api.example.com/v1///"), "https://api.example.com/v1");
    }

    #[test]
    fn chat_messages_lead_with_system_prompt() {
        let core = HttpProviderCore::new(
            reqwest::Client::new(),
            ProviderSettings {
                base_url: "https://api.test".to_string(),
                api_key: "k".to_string(),
                chat_model: "m".to_string(),
                image_model: "i".to_string(),
                image_size: "1024x1024".to_string(),
            },
        );

        let history = vec![Turn::user("Hi"), Turn::assistant("Hello!")];
        let messages = core.chat_messages("You are a critic.", &history);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "You are a critic.");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[2].content, "Hello!");
    }
}
