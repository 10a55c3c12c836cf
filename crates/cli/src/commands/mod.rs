pub mod ask;
pub mod books;
pub mod chat;
pub mod check;
pub mod config_cmd;

use std::path::Path;
use std::sync::Arc;
use taoloop_config::AppConfig;
use taoloop_core::provider::Provider;

/// Load configuration from `path` (or the default location) plus environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Build the configured provider, explaining how to set a key if none is found.
pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in a .env file):");
        eprintln!("    TAOLOOP_API_KEY              = '...'   (generic)");
        eprintln!("    OPEN_API_GITHUB_MODEL_TOKEN  = 'ghp_...' (GitHub Models)");
        eprintln!("    OPENAI_API_KEY               = 'sk-...'  (OpenAI direct)");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(taoloop_providers::build_from_config(config)?)
}
