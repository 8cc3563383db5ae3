pub mod ai;
pub mod cleaner;
pub mod config;
pub mod export;
pub mod generator;
pub mod prompt;
pub mod request;
pub mod state;

// Re-export main types for convenience
pub use ai::{GeminiClient, GeminiError, TextGenerator};
pub use cleaner::clean_output;
pub use config::{ApiKeySource, Config, FormDefaults};
pub use generator::{
    failure_message, generate_blog, is_warning, try_generate_blog, WARNING_MARKER,
};
pub use prompt::build_prompt;
pub use request::{EmojiIntensity, GenerationRequest, Language, Tone};
pub use state::{BlogSession, GenerateOutcome};
