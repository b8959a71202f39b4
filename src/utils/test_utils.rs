use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::app::App;
use crate::core::config::Config;
use crate::core::message::Turn;
use crate::core::roles::RoleRegistry;
use crate::core::session::Session;
use crate::provider::{ImageResult, ProviderAdapter, ProviderError};
use crate::utils::logging::LoggingState;

/// A provider double driven by a script of canned outcomes. Every call is
/// recorded so tests can assert that guards prevented remote calls.
pub struct ScriptedProvider {
    chat_script: Mutex<VecDeque<Result<String, ProviderError>>>,
    image_script: Mutex<VecDeque<Result<ImageResult, ProviderError>>>,
    chat_requests: Mutex<Vec<(String, usize)>>,
    image_requests: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn empty() -> Self {
        Self {
            chat_script: Mutex::new(VecDeque::new()),
            image_script: Mutex::new(VecDeque::new()),
            chat_requests: Mutex::new(Vec::new()),
            image_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chat_replies(replies: Vec<&str>) -> Self {
        let provider = Self::empty();
        provider
            .chat_script
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(|r| Ok(r.to_string())));
        provider
    }

    pub fn with_chat_error(error: ProviderError) -> Self {
        let provider = Self::empty();
        provider.chat_script.lock().unwrap().push_back(Err(error));
        provider
    }

    pub fn with_image_result(result: ImageResult) -> Self {
        let provider = Self::empty();
        provider.image_script.lock().unwrap().push_back(Ok(result));
        provider
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_requests.lock().unwrap().len()
    }

    pub fn image_calls(&self) -> usize {
        self.image_requests.lock().unwrap().len()
    }

    pub fn chat_system_prompts(&self) -> Vec<String> {
        self.chat_requests
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _)| prompt.clone())
            .collect()
    }

    pub fn chat_history_sizes(&self) -> Vec<usize> {
        self.chat_requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, size)| *size)
            .collect()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn shape_name(&self) -> &'static str {
        "scripted"
    }

    async fn complete_chat(
        &self,
        system_prompt: &str,
        history: &[Turn],
    ) -> Result<String, ProviderError> {
        self.chat_requests
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), history.len()));
        self.chat_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::MalformedResponse(
                    "scripted provider exhausted".to_string(),
                ))
            })
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageResult, ProviderError> {
        self.image_requests.lock().unwrap().push(prompt.to_string());
        self.image_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::MalformedResponse(
                    "scripted provider exhausted".to_string(),
                ))
            })
    }
}

pub fn create_test_app() -> App {
    let config = Config::default();
    let registry = RoleRegistry::from_config(&config);
    let role = registry.default_role(&config).clone();
    let session = Session::new(role, config.image_generation_enabled());
    App::new(registry, session, LoggingState::new(None))
}
