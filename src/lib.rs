pub mod catalog;
pub mod chat;
pub mod core;
pub mod llm;
pub mod ocr;
pub mod server;
pub mod state;
