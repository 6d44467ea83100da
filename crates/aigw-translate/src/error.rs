use crate::data_uri::DataUriError;
use crate::schema::SchemaError;

/// Messages follow the wording clients already see from the gateway.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("failed to translate request: {0}")]
    Request(Box<TranslateError>),
    #[error("error converting {role} message: {source}")]
    Message {
        role: &'static str,
        #[source]
        source: Box<TranslateError>,
    },
    #[error("invalid role in message: {0}")]
    InvalidRole(&'static str),
    #[error("audio content not supported yet")]
    AudioNotSupported,
    #[error("file content not supported yet")]
    FileNotSupported,
    #[error("failed to parse data URI: {0}")]
    DataUri(#[from] DataUriError),
    #[error("function arguments should be valid json string. failed to parse function arguments: {0}")]
    FunctionArguments(String),
    #[error("tool-type image generation not supported yet when translating OpenAI req to Gemini")]
    ImageGenerationTool,
    #[error("unsupported tool type: {0}")]
    UnsupportedToolType(&'static str),
    #[error("unsupported tool choice: '{0}'")]
    UnsupportedToolChoice(String),
    #[error("invalid JSON schema for parameters in tool {tool}: {source}")]
    ToolParameters {
        tool: String,
        #[source]
        source: SchemaError,
    },
    #[error("invalid JSON schema for parameters in tool {tool}: expected object, got {found}")]
    ToolParametersNotObject { tool: String, found: &'static str },
    #[error("invalid JSON schema: {0}")]
    ResponseSchema(String),
    #[error("duplicate json scheme specifications")]
    DuplicateSchema,
    #[error(
        "multiple format specifiers specified. only one of responseFormat, guidedChoice, guidedRegex, guidedJSON can be specified"
    )]
    MultipleFormatSpecifiers,
    #[error("failed to read body: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode upstream response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TranslateError {
    pub(crate) fn in_message(self, role: &'static str) -> Self {
        Self::Message {
            role,
            source: Box::new(self),
        }
    }
}
