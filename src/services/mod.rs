pub mod ai_service;
pub mod extractor;
pub mod gemini; // Gemini generateContent client
pub mod prompts;

pub use ai_service::TextGenerator;
pub use gemini::GeminiClient;
