use std::borrow::Cow;

use bytes::{BufMut, BytesMut};

/// Terminal event appended once the upstream stream has ended.
pub const DONE_EVENT: &[u8] = b"data: [DONE]\n";

/// Rewrites CRLF line endings to LF so frames split on a single separator.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Splits buffered SSE text into blank-line separated frames.
///
/// The last element is whatever followed the final separator; it may be an
/// incomplete frame or an empty string.
pub fn split_frames(buffer: &str) -> Vec<&str> {
    buffer.split("\n\n").collect()
}

/// Trims a frame and removes a leading `data:` field name, with or without
/// the conventional space.
pub fn strip_data_prefix(frame: &str) -> &str {
    strip_field_name(frame.trim())
}

/// Same as [`strip_data_prefix`] but keeps trailing whitespace, which may
/// belong to a JSON string that continues in the next chunk.
pub fn strip_partial_data_prefix(frame: &str) -> &str {
    strip_field_name(frame.trim_start())
}

fn strip_field_name(frame: &str) -> &str {
    if let Some(rest) = frame.strip_prefix("data: ") {
        return rest;
    }
    frame.strip_prefix("data:").unwrap_or(frame)
}

/// Writes one `data: <payload>\n\n` event.
pub fn push_data(buf: &mut BytesMut, payload: &[u8]) {
    buf.reserve(payload.len() + 8);
    buf.put_slice(b"data: ");
    buf.put_slice(payload);
    buf.put_slice(b"\n\n");
}
