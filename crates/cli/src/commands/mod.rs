pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod plan;
pub mod summarize;

use std::path::Path;
use std::sync::Arc;

use docent_agent::ModelGateway;
use docent_config::AppConfig;
use docent_core::provider::Provider;

/// Load the config, failing early with setup help when a hosted provider
/// has no API key. Local providers run without one.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?;

    if config.requires_api_key() && !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENAI_API_KEY='sk-...'         (OpenAI)");
        eprintln!("    export OPENROUTER_API_KEY='sk-or-...'  (OpenRouter)");
        eprintln!("    export DOCENT_API_KEY='sk-...'         (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    Ok(config)
}

/// The default provider from config.
pub(crate) fn default_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    let router = docent_providers::router::build_from_config(config);
    let provider = router
        .default()
        .ok_or_else(|| format!("No provider configured for `{}`", config.default_provider))?;
    Ok(provider)
}

/// A gateway over the default provider with the configured model settings.
pub(crate) fn default_gateway(config: &AppConfig) -> Result<ModelGateway, Box<dyn std::error::Error>> {
    Ok(ModelGateway::from_config(default_provider(config)?, config))
}
