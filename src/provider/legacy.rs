//! Older-generation provider shape: chat replies may arrive as bare
//! `choices[].text`, images always come back as a URL.

use async_trait::async_trait;

use super::{HttpProviderCore, ImageResult, ProviderAdapter, ProviderError};
use crate::api::{ChatRequest, ImageRequest};
use crate::core::message::Turn;

pub struct LegacyProvider {
    core: HttpProviderCore,
}

impl LegacyProvider {
    pub(crate) fn new(core: HttpProviderCore) -> Self {
        Self { core }
    }
}

#[async_trait]
impl ProviderAdapter for LegacyProvider {
    fn shape_name(&self) -> &'static str {
        "legacy"
    }

    async fn complete_chat(
        &self,
        system_prompt: &str,
        history: &[Turn],
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: self.core.settings().chat_model.clone(),
            messages: self.core.chat_messages(system_prompt, history),
            stream: false,
        };

        let response = self.core.post_chat(&request).await?;
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            ProviderError::MalformedResponse("chat response carried no choices".to_string())
        })?;

        // Transitional gateways serve both fields; prefer the legacy one,
        // fall back to the message object.
        choice
            .text
            .or_else(|| choice.message.and_then(|message| message.content))
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "chat response carried neither text nor message content".to_string(),
                )
            })
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageResult, ProviderError> {
        let request = ImageRequest {
            model: self.core.settings().image_model.clone(),
            prompt: prompt.to_string(),
            size: self.core.settings().image_size.clone(),
            response_format: None,
        };

        let response = self.core.post_images(&request).await?;
        response
            .data
            .into_iter()
            .next()
            .and_then(|data| data.url)
            .map(ImageResult::Url)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("image response carried no URL".to_string())
            })
    }
}
