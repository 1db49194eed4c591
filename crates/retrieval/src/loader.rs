//! Document loading from disk.
//!
//! Accepts a single text/Markdown file or a directory of them (top level
//! only). PDF input is rejected.

use std::path::{Path, PathBuf};

use docent_core::error::RetrievalError;
use serde::{Deserialize, Serialize};

const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

/// A loaded document: where it came from and its full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub source: String,
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// Load every document at `path`.
///
/// A directory yields its `.txt`/`.md` files sorted by name; other files in
/// it are skipped. A file path must not be a PDF.
pub async fn load_documents(path: &Path) -> Result<Vec<Document>, RetrievalError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| load_error(path, e))?;

    if !metadata.is_dir() {
        return Ok(vec![load_file(path).await?]);
    }

    let mut entries = tokio::fs::read_dir(path).await.map_err(|e| load_error(path, e))?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| load_error(path, e))? {
        let candidate = entry.path();
        if candidate.is_file() && has_text_extension(&candidate) {
            files.push(candidate);
        } else {
            tracing::debug!(path = %candidate.display(), "Skipping non-text entry");
        }
    }
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for file in &files {
        documents.push(load_file(file).await?);
    }

    tracing::info!(
        path = %path.display(),
        documents = documents.len(),
        "Loaded documents"
    );
    Ok(documents)
}

async fn load_file(path: &Path) -> Result<Document, RetrievalError> {
    let extension = extension_of(path);
    if extension.as_deref() == Some("pdf") {
        return Err(RetrievalError::UnsupportedFormat(format!(
            "{} (PDF is not supported; convert it to text first)",
            path.display()
        )));
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| load_error(path, e))?;

    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Document { source, text })
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn has_text_extension(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
}

fn load_error(path: &Path, error: std::io::Error) -> RetrievalError {
    RetrievalError::Load {
        path: path.display().to_string(),
        reason: error.to_string(),
    }
}
