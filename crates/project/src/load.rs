use crate::ProjectError;
use std::path::Path;

/// Read a whole document as UTF-8 text.
///
/// The text is handed back untouched; interpreting it is the editor's job.
pub async fn read_document(path: &Path) -> Result<String, ProjectError> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProjectError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), bytes = data.len(), "read document");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_document_returns_raw_text() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("scene.json");
        std::fs::write(&path, "{\"version\":\"4.0.0\"}").expect("write");

        let data = read_document(&path).await.expect("read");
        assert_eq!(data, "{\"version\":\"4.0.0\"}");
    }

    #[tokio::test]
    async fn test_read_document_file_not_found() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("missing.json");

        let err = read_document(&path).await.unwrap_err();
        assert!(matches!(err, ProjectError::Read { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_read_document_rejects_invalid_utf8() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("binary.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).expect("write");

        assert!(read_document(&path).await.is_err());
    }
}
