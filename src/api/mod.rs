//! API Module
//!
//! Backend wire formats: request encoding and reply extraction as pure
//! functions, kept apart from the HTTP transport.

pub mod gemini;
pub mod openai;
