// Protocol mappers
pub mod openai;
