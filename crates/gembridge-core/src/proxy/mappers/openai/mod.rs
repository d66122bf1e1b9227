// OpenAI mapper module
// Handles OpenAI ↔ Gemini protocol conversion

pub mod embeddings;
pub mod models;
pub mod request;
pub mod response;
pub mod streaming;

pub use request::transform_openai_request;
pub use response::{completion_response, usage_from_metadata, ResponseContext};
