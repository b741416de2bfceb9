//! Command line argument parsing
//!
//! The binary takes a single optional target directory plus flags that
//! override values from the discovered configuration file.

use super::config::AppConfig;
use crate::llm::ProviderType;
use crate::workflow::RecursionPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "folder-agent")]
#[command(author = "Folder Agent Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan a directory and summarize its text files with a language model")]
#[command(long_about = None)]
pub struct Args {
    /// Directory to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,
    /// Print per-task progress as the run advances
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    /// Log prompts and raw model responses
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Language model backend
    #[arg(long = "backend", value_enum)]
    pub backend: Option<Backend>,
    /// Model name passed to the backend
    #[arg(long = "model")]
    pub model: Option<String>,
    /// Also analyze subdirectories
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,
    /// Deepest subdirectory level analyzed (implies --recursive)
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<u32>,
    /// Sibling files summarized at once
    #[arg(long = "concurrency", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,
    /// Timeout in seconds for each model call
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Attempts per file before giving up
    #[arg(long = "retries", value_name = "N")]
    pub retries: Option<u32>,
    /// Report format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Show configuration discovery information and exit
    #[arg(long = "show-config")]
    pub show_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Ollama,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<Backend> for ProviderType {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Ollama => ProviderType::Ollama,
            Backend::Openai => ProviderType::OpenAI,
        }
    }
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Overlay command line flags on a loaded configuration
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(backend) = self.backend {
            let provider_type = ProviderType::from(backend);
            if provider_type != config.provider.provider_type {
                // A model or endpoint chosen for another backend does not carry over
                config.provider.model = None;
                config.provider.base_url = None;
            }
            config.provider.provider_type = provider_type;
        }
        if let Some(model) = &self.model {
            config.provider.model = Some(model.clone());
        }

        if let Some(max_depth) = self.max_depth {
            config.workflow.recursion = RecursionPolicy::Recursive {
                max_depth: Some(max_depth),
            };
        } else if self.recursive {
            config.workflow.recursion = RecursionPolicy::Recursive { max_depth: None };
        }

        if let Some(concurrency) = self.concurrency {
            config.workflow.max_concurrent_summaries = usize::from(concurrency);
        }
        if let Some(timeout) = self.timeout {
            config.workflow.agent_timeout_secs = timeout;
        }
        if let Some(retries) = self.retries {
            config.workflow.retry.max_attempts = retries.max(1);
        }
    }

    /// Default `tracing` filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "folder_agent=debug"
        } else if self.verbose {
            "folder_agent=info"
        } else {
            "folder_agent=warn"
        }
    }
}
