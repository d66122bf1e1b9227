// OpenAI embeddings ↔ Gemini batchEmbedContents
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use gembridge_types::protocol::gemini::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, Content, EmbedContentRequest,
    GeminiRole, Part,
};
use gembridge_types::protocol::openai::{
    EmbeddingData, EmbeddingVector, EmbeddingsRequest, EmbeddingsResponse, EncodingFormat,
};

use crate::proxy::upstream::client::model_resource;

pub fn transform_embeddings_request(request: &EmbeddingsRequest) -> BatchEmbedContentsRequest {
    let model = model_resource(&request.model);
    let requests = request
        .input
        .clone()
        .into_vec()
        .into_iter()
        .map(|text| EmbedContentRequest {
            model: model.clone(),
            content: Content::new(GeminiRole::User, vec![Part::text(text)]),
            output_dimensionality: request.dimensions,
        })
        .collect();
    BatchEmbedContentsRequest { requests }
}

pub fn transform_embeddings_response(
    request: &EmbeddingsRequest,
    response: BatchEmbedContentsResponse,
) -> EmbeddingsResponse {
    let data = response
        .embeddings
        .into_iter()
        .enumerate()
        .map(|(index, embedding)| EmbeddingData {
            index,
            object: "embedding".to_string(),
            embedding: encode_vector(embedding.values, request.encoding_format),
        })
        .collect();

    EmbeddingsResponse { object: "list".to_string(), data, model: request.model.clone() }
}

/// `base64` packs the floats as little-endian f32 bytes, as OpenAI does.
fn encode_vector(values: Vec<f32>, format: EncodingFormat) -> EmbeddingVector {
    match format {
        EncodingFormat::Float => EmbeddingVector::Float(values),
        EncodingFormat::Base64 => {
            let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
            EmbeddingVector::Base64(STANDARD.encode(bytes))
        },
    }
}
