//! Shared constants used across the application

/// Default chat completion model when neither CLI nor config override it.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default image generation model.
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";

/// Default size string sent with image generation requests.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Default API endpoint when OPENAI_BASE_URL is not set.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
