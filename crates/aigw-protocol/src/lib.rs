//! Wire shapes for the OpenAI chat-completions API and the Vertex AI Gemini
//! `generateContent` API.

pub mod gemini;
pub mod openai;
pub mod sse;
