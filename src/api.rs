//! Chat and image payloads shared by the provider adapters.
//!
//! The remote service comes in two generations. Both accept the same chat
//! request body; they differ in where the reply text lives in the response
//! (`choices[].message.content` vs the older `choices[].text`) and in how
//! generated images come back (inline base64 vs a URL). The response types
//! here carry both shapes so each adapter can extract what it expects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponseChoice {
    /// Modern shape: the reply as a message object.
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
    /// Legacy shape: the reply as bare completion text.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

#[derive(Serialize, Debug)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    /// Modern servers honor this and return inline base64 data; the legacy
    /// request omits it and gets a URL back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ImageData {
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ImageResponse {
    pub data: Vec<ImageData>,
}

/// Response to the `models` listing used as the startup capability probe.
#[derive(Deserialize, Debug)]
pub struct ModelInfo {
    pub id: String,
}

#[derive(Deserialize, Debug)]
pub struct ModelsResponse {
    pub data: Vec<ModelInfo>,
}

fn extract_error_summary(value: &Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                Value::String(s) => Some(s.to_string()),
                Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

/// Condense a provider error body into a single displayable line. Error
/// payloads vary: `{"error": {"message": ...}}`, `{"error": "..."}`, a bare
/// `{"message": ...}`, or something that is not JSON at all.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();

    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return summary;
            }
        }
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() > 200 {
        let mut cut = 200;
        while !collapsed.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &collapsed[..cut])
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_chat_shape_parses() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"},"finish_reason":"stop"}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let choice = &response.choices[0];
        assert_eq!(choice.message.as_ref().unwrap().content.as_deref(), Some("hello"));
        assert!(choice.text.is_none());
    }

    #[test]
    fn legacy_chat_shape_parses() {
        let body = r#"{"choices":[{"text":"hello","index":0}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let choice = &response.choices[0];
        assert_eq!(choice.text.as_deref(), Some("hello"));
        assert!(choice.message.is_none());
    }

    #[test]
    fn image_shapes_parse() {
        let inline: ImageResponse =
            serde_json::from_str(r#"{"created":1,"data":[{"b64_json":"aGk="}]}"#).unwrap();
        assert_eq!(inline.data[0].b64_json.as_deref(), Some("aGk="));
        assert!(inline.data[0].url.is_none());

        let by_url: ImageResponse =
            serde_json::from_str(r#"{"data":[{"url":"https://img.example/x.png"}]}"#).unwrap();
        assert_eq!(by_url.data[0].url.as_deref(), Some("https://img.example/x.png"));
    }

    #[test]
    fn image_request_omits_absent_response_format() {
        let request = ImageRequest {
            model: "gpt-image-1".to_string(),
            prompt: "a sunset".to_string(),
            size: "1024x1024".to_string(),
            response_format: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("response_format"));
    }

    #[test]
    fn error_summaries_cover_payload_variants() {
        assert_eq!(
            summarize_error_body(r#"{"error":{"message":"model  not\nfound"}}"#),
            "model not found"
        );
        assert_eq!(
            summarize_error_body(r#"{"error":"quota exceeded"}"#),
            "quota exceeded"
        );
        assert_eq!(
            summarize_error_body(r#"{"message":"bad request"}"#),
            "bad request"
        );
        assert_eq!(summarize_error_body("  plain text  "), "plain text");
        assert_eq!(summarize_error_body(""), "<empty response body>");
    }
}
