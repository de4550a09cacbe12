//! OpenAI-Compatible Chat API
//!
//! Request and response shapes for `/chat/completions` backends
//! (HuggingFace router, OpenRouter, Groq, and friends).

use serde::{Deserialize, Serialize};

/// A message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user" or "assistant"
    pub role: String,

    /// Message content
    pub content: MessageContent,
}

/// Message content - can be a simple string or array of parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple string content
    Text(String),

    /// Array of content parts
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Convert to string (concatenating text parts if needed)
    pub fn to_string_content(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// A content part; only text parts carry reply text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub part_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,

    /// Messages in the conversation
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Single user turn
    pub fn user(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: MessageContent::Text(prompt.to_string()),
            }],
        }
    }
}

/// Chat completion response. Every field is optional so that a missing
/// reply is reported as unparsable instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

impl ChatResponse {
    /// Text of the first choice
    pub fn content(&self) -> Option<String> {
        self.choices
            .as_ref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_ref()
            .map(MessageContent::to_string_content)
    }
}

/// Serialize a single-prompt chat request
pub fn encode_request(model: &str, prompt: &str) -> serde_json::Result<String> {
    serde_json::to_string(&ChatRequest::user(model, prompt))
}

/// Pull the reply text out of a response body; `None` when it is not there
pub fn decode_reply(body: &str) -> Option<String> {
    serde_json::from_str::<ChatResponse>(body)
        .ok()
        .and_then(|r| r.content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let json = encode_request("llama2-70b-4096", "Hello").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "llama2-70b-4096",
                "messages": [{ "role": "user", "content": "Hello" }]
            })
        );
    }

    #[test]
    fn test_decode_reply() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-4",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "Hello!" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }"#;

        assert_eq!(decode_reply(json), Some("Hello!".to_string()));
    }

    #[test]
    fn test_decode_content_parts() {
        let json = r#"{"choices":[{"message":{"content":[
            {"type":"text","text":"Hello "},
            {"type":"image_url"},
            {"type":"text","text":"World"}
        ]}}]}"#;

        assert_eq!(decode_reply(json), Some("Hello World".to_string()));
    }

    #[test]
    fn test_decode_missing_reply() {
        assert_eq!(decode_reply(r#"{"choices":[]}"#), None);
        assert_eq!(decode_reply(r#"{"choices":[{"message":{"content":null}}]}"#), None);
        assert_eq!(decode_reply(r#"{"error":{"message":"nope"}}"#), None);
        assert_eq!(decode_reply("not json"), None);
    }
}
