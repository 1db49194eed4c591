//! `docent summarize`: structured summary of a patient note.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    file: Option<&Path>,
    note: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let note = match (file, note) {
        (Some(path), _) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        (None, Some(note)) => note,
        (None, None) => return Err("Provide a note or --file".into()),
    };
    if note.trim().is_empty() {
        return Err("The note is empty".into());
    }

    let config = super::load_config(config_path)?;
    let gateway = super::default_gateway(&config)?;

    let summary = docent_agent::summarize_note(&gateway, &note).await?;

    println!();
    println!("  Summary:");
    println!("    {}", summary.summary);
    println!();
    println!("  Problems:");
    for problem in &summary.problems {
        println!("    - {problem}");
    }
    println!();

    Ok(())
}
