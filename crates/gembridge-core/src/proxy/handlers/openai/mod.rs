// OpenAI-compatible endpoints
mod chat;
mod completions;
mod embeddings;
mod models;

pub use chat::handle_chat_completions;
pub use completions::handle_completions;
pub use embeddings::handle_embeddings;
pub use models::handle_list_models;
