pub mod config;
pub mod headers;
pub mod mutation;
pub mod usage;

pub use config::{ConfigError, TranslatorConfig, TranslatorConfigPatch};
pub use headers::{CONTENT_LENGTH, CONTENT_TYPE, Headers, PATH, STATUS, header_get, header_set};
pub use mutation::{RequestMutation, ResponseMutation, content_length_headers};
pub use usage::LlmTokenUsage;
