//! OpenAI chat-completions to GCP Vertex AI (Gemini) translation.
//!
//! [`GcpVertexAiChatCompletionTranslator`] rewrites one exchange: the request
//! body and path on the way out, then response headers, buffered or streamed
//! bodies, and error bodies on the way back.

pub mod chat_completions;
pub mod data_uri;
pub mod error;
pub mod schema;
pub mod translator;

pub use data_uri::DataUriError;
pub use error::TranslateError;
pub use schema::SchemaError;
pub use translator::{
    ChatCompletionTranslator, EVENT_STREAM_CONTENT_TYPE, GcpVertexAiChatCompletionTranslator,
};
