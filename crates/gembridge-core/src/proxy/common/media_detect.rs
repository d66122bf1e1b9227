use tracing::debug;

/// Fallback when the payload's magic bytes are not recognised.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Sniff a MIME type from decoded bytes.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match infer::get(bytes) {
        Some(kind) => {
            debug!(detected = kind.mime_type(), "Detected inline media type");
            kind.mime_type()
        },
        None => DEFAULT_IMAGE_MIME,
    }
}

/// Drop a leading `data:<mime>;base64,` header, if any.
pub fn strip_data_url_prefix(value: &str) -> &str {
    if value.starts_with("data:") {
        if let Some((_, payload)) = value.split_once(',') {
            return payload;
        }
    }
    value
}
