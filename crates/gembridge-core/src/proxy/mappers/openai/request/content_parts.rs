use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use reqwest::Client;

use gembridge_types::protocol::gemini::Part;
use gembridge_types::protocol::openai::{ContentPart, TypedContentPart};
use gembridge_types::TranslationError;

use crate::proxy::common::media_detect::{detect_image_mime, strip_data_url_prefix};

/// Standard alphabet, trailing `=` optional on input.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub async fn transform_content_part(
    part: &ContentPart,
    http_client: &Client,
) -> Result<Part, TranslationError> {
    match part {
        ContentPart::Typed(TypedContentPart::Text { text }) => Ok(Part::text(text.clone())),
        ContentPart::Typed(TypedContentPart::ImageUrl { image_url }) => {
            if image_url.url.starts_with("http") {
                fetch_remote_image(&image_url.url, http_client).await
            } else {
                inline_image(&image_url.url)
            }
        },
        other => Err(TranslationError::unsupported(other.kind())),
    }
}

async fn fetch_remote_image(url: &str, http_client: &Client) -> Result<Part, TranslationError> {
    tracing::debug!("[OpenAI-Request] Fetching remote image: {}", url);

    let fetch_error =
        |message: String| TranslationError::ImageFetch { url: url.to_string(), message };

    let response = http_client.get(url).send().await.map_err(|e| fetch_error(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(format!("HTTP {}", status)));
    }
    let bytes = response.bytes().await.map_err(|e| fetch_error(e.to_string()))?;

    let mime_type = detect_image_mime(&bytes);
    Ok(Part::inline_data(mime_type, STANDARD.encode(&bytes)))
}

fn inline_image(value: &str) -> Result<Part, TranslationError> {
    let data = strip_data_url_prefix(value).trim();
    let bytes = LENIENT_STANDARD
        .decode(data)
        .map_err(|e| TranslationError::InvalidBase64 { message: e.to_string() })?;

    Ok(Part::inline_data(detect_image_mime(&bytes), data))
}
