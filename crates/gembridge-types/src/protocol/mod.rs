//! Protocol definitions for the two sides of the gateway:
//! - OpenAI (ChatCompletions, Embeddings, Models)
//! - Google Gemini (GenerateContent, BatchEmbedContents, ListModels)

pub mod gemini;
pub mod openai;

pub use gemini::GeminiRole;
pub use openai::OpenAIRole;
