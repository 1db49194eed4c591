//! `docent doctor`: diagnose config and provider health.

use std::path::{Path, PathBuf};

use docent_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("docent doctor");
    println!("=============\n");

    let mut issues = 0;

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    if path.exists() {
        println!("  ✅ Config file found at {}", path.display());
    } else {
        println!("  ⚠️  No config file at {}, using defaults", path.display());
    }

    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  1 issue found. Fix the config and run again.");
            return Ok(());
        }
    };

    println!("     Provider:  {}", config.default_provider);
    println!("     Model:     {}", config.default_model);
    println!("     Embedding: {}", config.retrieval.embedding_model);

    match &config.retrieval.document_path {
        Some(doc) if PathBuf::from(doc).exists() => println!("  ✅ Document found: {doc}"),
        Some(doc) => {
            println!("  ❌ Document not found: {doc}");
            issues += 1;
        }
        None => println!("  ⚠️  No retrieval.document_path; pass --document to `docent chat`"),
    }

    if config.has_api_key() || !config.requires_api_key() {
        if config.has_api_key() {
            println!("  ✅ API key configured");
        } else {
            println!("  ✅ Local provider, no API key needed");
        }

        let provider = super::default_provider(&config)?;
        match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider `{}` reachable", provider.name()),
            Ok(false) => {
                println!("  ❌ Provider `{}` did not respond", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider `{}` failed: {e}", provider.name());
                issues += 1;
            }
        }
    } else {
        println!("  ❌ No API key configured; set OPENAI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
