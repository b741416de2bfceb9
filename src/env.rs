//! Environment constants and path utilities for the folder agent.
//!
//! This module centralizes the hardcoded file names, environment variable
//! names and built-in defaults used throughout the application.

use std::path::{Path, PathBuf};

/// Application directory name (hidden directory like .git, .vscode)
pub const APP_DIR_NAME: &str = ".folder-agent";

/// Configuration file name inside [`APP_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up directly in the working directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "folder-agent.toml";

/// Environment variables read once by the binary before the first run
pub mod vars {
    /// API key for the OpenAI backend
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    /// Base URL override for the OpenAI backend
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

    /// Base URL override for the Ollama backend
    pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
}

/// Built-in provider defaults
pub mod defaults {
    /// Default Ollama endpoint
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

    /// Default OpenAI endpoint
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

    /// Default model for the Ollama backend
    pub const OLLAMA_MODEL: &str = "deepseek-r1:14b";

    /// Default model for the OpenAI backend
    pub const OPENAI_MODEL: &str = "gpt-4o-mini";

    /// Default system prompt handed to the text analyzer
    pub const TEXT_ANALYZER_SYSTEM_PROMPT: &str =
        "Analyze text files one at a time and provide a concise summary of their contents.";
}

/// Build the application directory path from a base directory
pub fn app_dir_path(base: &Path) -> PathBuf {
    base.join(APP_DIR_NAME)
}

/// Build the local config file path (`./.folder-agent/config.toml`)
pub fn local_config_file_path(base: &Path) -> PathBuf {
    app_dir_path(base).join(CONFIG_FILE_NAME)
}

/// Build the user config file path (`~/.folder-agent/config.toml`)
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    app_dir_path(home_dir).join(CONFIG_FILE_NAME)
}
