// Handlers module - API endpoint handlers
pub mod common;
pub mod openai;
