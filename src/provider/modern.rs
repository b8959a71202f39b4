//! Current-generation provider shape: chat replies arrive as
//! `choices[].message.content`, images as inline base64 data.

use async_trait::async_trait;
use base64::Engine;

use super::{HttpProviderCore, ImageResult, ProviderAdapter, ProviderError};
use crate::api::{ChatRequest, ImageRequest};
use crate::core::message::Turn;

pub struct ModernProvider {
    core: HttpProviderCore,
}

impl ModernProvider {
    pub(crate) fn new(core: HttpProviderCore) -> Self {
        Self { core }
    }
}

#[async_trait]
impl ProviderAdapter for ModernProvider {
    fn shape_name(&self) -> &'static str {
        "modern"
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
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "chat response carried no message content".to_string(),
                )
            })
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageResult, ProviderError> {
        let request = ImageRequest {
            model: self.core.settings().image_model.clone(),
            prompt: prompt.to_string(),
            size: self.core.settings().image_size.clone(),
            response_format: Some("b64_json".to_string()),
        };

        let response = self.core.post_images(&request).await?;
        let encoded = response
            .data
            .into_iter()
            .next()
            .and_then(|data| data.b64_json)
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "image response carried no inline data".to_string(),
                )
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(ProviderError::ImageDecode)?;
        Ok(ImageResult::Bytes(bytes))
    }
}
