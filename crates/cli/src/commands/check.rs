//! `taoloop check`: Probe the configured model endpoint.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Checking configuration...");
    println!();

    let config = super::load_config(config_path)?;
    println!("  Provider:  {}", config.provider_name);
    println!("  Endpoint:  {}", config.endpoint);
    println!("  Model:     {}", config.model);
    println!();

    let provider = super::build_provider(&config)?;

    match provider.health_check().await {
        Ok(()) => {
            println!("  ✅ Model reachable");
            Ok(())
        }
        Err(e) => {
            println!("  ❌ {e}");
            println!();
            println!("  Verify:");
            println!("    1. A .env file or environment variable provides the API key");
            println!("    2. The key is valid for {}", config.endpoint);
            println!("    3. The model '{}' is available to that key", config.model);
            Err(e.into())
        }
    }
}
