pub mod fallback;
pub mod gemini;
pub mod provider;
pub mod types;

pub use fallback::FallbackGenerator;
pub use gemini::GeminiProvider;
pub use provider::TextGenerator;
pub use types::GenerationError;
