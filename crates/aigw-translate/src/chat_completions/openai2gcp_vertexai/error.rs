use aigw_common::{Headers, STATUS, content_length_headers, header_get};
use aigw_protocol::gemini::error::GcpErrorResponse;
use aigw_protocol::openai::error::OpenAiErrorResponse;
use bytes::Bytes;
use tracing::warn;

use crate::error::TranslateError;

/// Error type reported when the upstream body is not a GCP error envelope.
pub const BACKEND_ERROR_TYPE: &str = "GCPVertexAIBackendError";

/// Rewrites an upstream error body into the OpenAI error envelope.
///
/// Returns the replacement headers (content length only) and body.
pub fn map_error(headers: &Headers, body: &[u8]) -> Result<(Headers, Bytes), TranslateError> {
    let status = header_get(headers, STATUS).map(str::to_string);

    let envelope = match serde_json::from_slice::<GcpErrorResponse>(body) {
        Ok(gcp) => {
            let mut message = format!("Error: {}", gcp.error.message);
            if let Some(details) = &gcp.error.details {
                message.push_str("\nDetails: ");
                message.push_str(details.get());
            }
            OpenAiErrorResponse::new(gcp.error.status, message, status)
        }
        Err(_) => OpenAiErrorResponse::new(
            BACKEND_ERROR_TYPE,
            String::from_utf8_lossy(body).into_owned(),
            status,
        ),
    };
    warn!(
        status = envelope.error.code.as_deref().unwrap_or("unknown"),
        error_type = %envelope.error.r#type,
        "upstream returned an error"
    );

    let encoded = serde_json::to_vec(&envelope).map_err(TranslateError::Encode)?;
    Ok((content_length_headers(&encoded), Bytes::from(encoded)))
}
