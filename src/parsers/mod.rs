pub mod senses;
pub mod sentences;
pub mod vocabulary;
