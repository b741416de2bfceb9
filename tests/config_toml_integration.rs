use folder_agent::cli::{AppConfig, ConfigDiscovery};
use folder_agent::llm::{LLMProviderFactory, ProviderType};
use folder_agent::workflow::RecursionPolicy;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_serialization_roundtrip() {
    let mut original = AppConfig::default();
    original.workflow.recursion = RecursionPolicy::Recursive { max_depth: Some(4) };
    original.workflow.retry.max_attempts = 6;
    original.provider.provider_type = ProviderType::OpenAI;

    let toml_str = toml::to_string_pretty(&original).expect("Should serialize config to TOML");
    assert!(toml_str.contains("[workflow.recursion]"));
    assert!(toml_str.contains("mode = \"recursive\""));
    assert!(toml_str.contains("provider_type = \"openai\""));

    let parsed: AppConfig = toml::from_str(&toml_str).expect("Should parse TOML string");
    assert_eq!(parsed.workflow, original.workflow);
    assert_eq!(parsed.provider.provider_type, ProviderType::OpenAI);
}

#[test]
fn test_empty_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("folder-agent.toml");
    fs::write(&path, "").unwrap();

    let config = AppConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.workflow, AppConfig::default().workflow);
    assert_eq!(config.provider.effective_model(), "deepseek-r1:14b");
}

#[test]
fn test_unknown_backend_rejected() {
    let result: Result<AppConfig, _> = toml::from_str("[provider]\nprovider_type = \"bard\"\n");
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_env_credentials_enable_openai_provider() {
    // SAFETY: serialized with every other test touching the environment
    unsafe {
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::remove_var("OPENAI_BASE_URL");
    }

    let mut config = AppConfig::default();
    config.provider.provider_type = ProviderType::OpenAI;
    assert!(LLMProviderFactory::create_provider(config.provider.clone()).is_err());

    config.apply_env_credentials();
    assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
    let provider = LLMProviderFactory::create_provider(config.provider.clone()).unwrap();
    assert_eq!(provider.provider_name(), "openai");

    unsafe {
        env::remove_var("OPENAI_API_KEY");
    }
}

#[test]
#[serial]
fn test_env_base_url_for_ollama() {
    unsafe {
        env::set_var("OLLAMA_BASE_URL", "http://gpu-box:11434");
    }

    let mut config = AppConfig::default();
    config.apply_env_credentials();
    assert_eq!(config.provider.base_url.as_deref(), Some("http://gpu-box:11434"));

    unsafe {
        env::remove_var("OLLAMA_BASE_URL");
    }
}

#[test]
#[serial]
fn test_discovery_prefers_local_file() {
    let temp_dir = TempDir::new().unwrap();
    let original_dir = env::current_dir().unwrap();
    fs::write(
        temp_dir.path().join("folder-agent.toml"),
        "[workflow]\ninclude_hidden = true\n",
    )
    .unwrap();

    env::set_current_dir(temp_dir.path()).unwrap();
    let found = ConfigDiscovery::find_config_file();
    let config = ConfigDiscovery::discover_config();
    env::set_current_dir(original_dir).unwrap();

    assert_eq!(found.unwrap().file_name().unwrap(), "folder-agent.toml");
    assert!(config.unwrap().workflow.include_hidden);
}
