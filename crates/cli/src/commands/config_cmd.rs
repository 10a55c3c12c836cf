//! `taoloop config`: Print configuration.

use std::path::Path;
use taoloop_config::AppConfig;

pub fn run(config_path: Option<&Path>, effective: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !effective {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = super::load_config(config_path)?;
    // Debug output redacts the API key.
    println!("{config:#?}");
    if !config.has_api_key() {
        println!();
        println!("⚠️  No API key set (TAOLOOP_API_KEY, OPEN_API_GITHUB_MODEL_TOKEN, GITHUB_TOKEN or OPENAI_API_KEY)");
    }
    Ok(())
}
