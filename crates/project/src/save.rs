use crate::ProjectError;
use std::path::Path;

/// Write `data` to `path`, replacing whatever was there.
pub async fn write_document(path: &Path, data: &str) -> Result<(), ProjectError> {
    tokio::fs::write(path, data)
        .await
        .map_err(|source| ProjectError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote document");
    Ok(())
}
