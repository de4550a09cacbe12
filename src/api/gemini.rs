//! Gemini generateContent API
//!
//! Nested `contents[].parts[]` request and `candidates[].content.parts[]`
//! response shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Option<Vec<Part>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateRequest {
    pub fn prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: Some(vec![Part {
                    text: Some(prompt.to_string()),
                }]),
            }],
        }
    }
}

impl GenerateResponse {
    /// Text of the first part of the first candidate
    pub fn text(&self) -> Option<String> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .first()?
            .text
            .clone()
    }
}

/// Serialize a single-prompt generate request
pub fn encode_request(prompt: &str) -> serde_json::Result<String> {
    serde_json::to_string(&GenerateRequest::prompt(prompt))
}

/// Pull the reply text out of a response body; `None` when it is not there
pub fn decode_reply(body: &str) -> Option<String> {
    serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|r| r.text())
}

/// Path for a model's generateContent call, relative to the API base
pub fn generate_path(model: &str) -> String {
    format!("/models/{}:generateContent", model)
}
