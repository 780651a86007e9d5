//! Loading benchmark documents from a local data directory

use std::path::Path;

use super::Document;

/// Errors raised while reading a data directory
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Load documents from every `*.json` file in `dir`, in file-name order.
///
/// Each file may hold a single document or a list of documents. Files that
/// fail to parse are skipped with a warning; a missing directory yields an
/// empty set rather than an error so a bare checkout still runs.
pub fn load_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<Document>, LoadError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        tracing::warn!("Data directory {} not found", dir.display());
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Error reading {}: {}", path.display(), e);
                continue;
            }
        };
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Array(items)) => {
                for item in items {
                    match serde_json::from_value::<Document>(item) {
                        Ok(doc) => documents.push(doc),
                        Err(e) => {
                            tracing::warn!("Skipping document in {}: {}", path.display(), e)
                        }
                    }
                }
            }
            Ok(value) => match serde_json::from_value::<Document>(value) {
                Ok(doc) => documents.push(doc),
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            },
            Err(e) => tracing::warn!("Error parsing {}: {}", path.display(), e),
        }
    }

    Ok(documents)
}
