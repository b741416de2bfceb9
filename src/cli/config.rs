//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./folder-agent.toml or ./.folder-agent/config.toml
//! 2. User config: ~/.folder-agent/config.toml
//! 3. Built-in defaults
//!
//! Credentials never live in these files; they are read from the environment
//! once by the binary and applied onto the provider settings.

use crate::env;
use crate::llm::{ProviderConfig, ProviderType};
use crate::workflow::WorkflowConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything the binary needs before the first run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub workflow: WorkflowConfig,
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("failed to write config file {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Fill provider settings the file left unset from environment variables
    pub fn apply_env_credentials(&mut self) {
        apply_credentials(&mut self.provider, |name| std_env::var(name).ok());
    }
}

/// Fill credentials and endpoint overrides through `lookup`, which maps an
/// environment variable name to its value. Values already set are kept.
pub fn apply_credentials<F>(provider: &mut ProviderConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    match provider.provider_type {
        ProviderType::OpenAI => {
            if provider.api_key.is_none() {
                provider.api_key = non_blank(env::vars::OPENAI_API_KEY);
            }
            if provider.base_url.is_none() {
                provider.base_url = non_blank(env::vars::OPENAI_BASE_URL);
            }
        }
        ProviderType::Ollama => {
            if provider.base_url.is_none() {
                provider.base_url = non_blank(env::vars::OLLAMA_BASE_URL);
            }
        }
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load the explicit file if given, else the first discovered one, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
        match explicit {
            Some(path) => {
                info!("Loading configuration override from: {}", path.display());
                AppConfig::from_toml_file(path)
            }
            None => Self::discover_config(),
        }
    }

    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<AppConfig> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {}", config_path.display());
            return AppConfig::from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(AppConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        for candidate in Self::get_config_candidates() {
            debug!("Checking for config file: {}", candidate.display());
            if candidate.is_file() {
                debug!("Found config file: {}", candidate.display());
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Get list of configuration file candidates in priority order
    pub fn get_config_candidates() -> Vec<PathBuf> {
        let current_dir = std_env::current_dir().ok();
        Self::candidates_for(current_dir.as_deref(), Self::get_home_dir().as_deref())
    }

    /// Candidate list for explicit base directories
    pub fn candidates_for(current_dir: Option<&Path>, home_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(current_dir) = current_dir {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(current_dir));
        }

        if let Some(home_dir) = home_dir {
            candidates.push(env::user_config_file_path(home_dir));
        }

        candidates
    }

    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info() {
        println!("Configuration Discovery Hierarchy:");
        println!();

        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {} - {}", i + 1, candidate.display(), status);
        }

        println!();
        match Self::find_config_file() {
            Some(found) => println!("Active configuration: {}", found.display()),
            None => println!("Active configuration: Built-in defaults"),
        }
    }
}
