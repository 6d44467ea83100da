use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUriError {
    #[error("data uri does not have a valid format")]
    InvalidFormat,
    #[error("failed to decode base64 data: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Splits `data:[<mediatype>][;base64],<payload>` into its media type and
/// decoded bytes. The payload is always treated as standard base64.
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>), DataUriError> {
    if !is_data_uri(uri) {
        return Err(DataUriError::InvalidFormat);
    }
    let rest = &uri[5..];
    let (media_type, payload) = rest.split_once(',').ok_or(DataUriError::InvalidFormat)?;
    let media_type = media_type.strip_suffix(";base64").unwrap_or(media_type);
    let data = STANDARD.decode(payload)?;
    Ok((media_type.to_string(), data))
}

pub fn is_data_uri(url: &str) -> bool {
    url.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Guesses an image MIME type from the extension of the URL's last path segment.
pub fn guess_image_mime(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rsplit_once('.')
        .and_then(|(_, ext)| mime_guess::from_ext(ext).first_raw())
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base64_data_uri() {
        let (mime, data) = parse_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, b"hello");
    }

    #[test]
    fn payload_is_base64_even_without_marker() {
        let (mime, data) = parse_data_uri("data:text/plain,aGk=").unwrap();
        assert_eq!(mime, "text/plain");
        assert_eq!(data, b"hi");
    }

    #[test]
    fn rejects_malformed_uris() {
        assert_eq!(
            parse_data_uri("image/png;base64,aGk="),
            Err(DataUriError::InvalidFormat)
        );
        assert_eq!(
            parse_data_uri("data:image/png;base64"),
            Err(DataUriError::InvalidFormat)
        );
        assert!(matches!(
            parse_data_uri("data:image/png;base64,!!!"),
            Err(DataUriError::Base64(_))
        ));
    }

    #[test]
    fn scheme_detection() {
        assert!(is_data_uri("data:image/png;base64,AA=="));
        assert!(is_data_uri("DATA:image/png;base64,AA=="));
        assert!(!is_data_uri("https://example.com/data:x"));
        assert!(!is_data_uri("dat"));
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_image_mime("https://example.com/cat.png"), "image/png");
        assert_eq!(guess_image_mime("gs://bucket/dir/photo.webp?x=1"), "image/webp");
        assert_eq!(guess_image_mime("https://example.com/image"), "image/jpeg");
        assert_eq!(guess_image_mime("https://example.com/v1.2/image"), "image/jpeg");
    }
}
