//! `docent config`: print the effective configuration.

use std::path::Path;

use docent_config::AppConfig;

pub fn show(config_path: Option<&Path>, default: bool) -> Result<(), Box<dyn std::error::Error>> {
    if default {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = AppConfig::load(config_path).map_err(|e| format!("Config error: {e}"))?;
    println!(
        "# {}",
        config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
            .display()
    );
    print!("{}", config.redacted_toml());
    Ok(())
}
