mod config;
mod error;
mod messages;
mod request;
mod response;
mod stream;


pub use config::{
    MIME_APPLICATION_JSON, MIME_TEXT_ENUM, MIME_TEXT_PLAIN, ResponseMode, supports_json_schema,
};
pub use error::{BACKEND_ERROR_TYPE, map_error};
pub use request::map_request;
pub use response::{
    extract_text, extract_tool_calls, map_finish_reason, map_logprobs, map_response, map_usage,
    token_usage,
};
pub use stream::StreamReassembler;
