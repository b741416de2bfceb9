pub mod ollama_provider;
pub mod openai_provider;
pub mod provider;
pub mod types;

pub use ollama_provider::OllamaProvider;
pub use openai_provider::OpenAIProvider;
pub use provider::{LLMProvider, LLMProviderFactory};
pub use types::*;
