mod fx;
mod load;
mod save;

use std::path::PathBuf;

pub use fx::{FxDefinitions, default_fx_directory, load_fx_definitions};
pub use load::read_document;
pub use save::write_document;

/// File-type filter shared by the open and save pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

pub const DOCUMENT_FILTER: DocumentFilter = DocumentFilter {
    name: "Automaton JSON File",
    extensions: &["json"],
};

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to prepare fx directory '{}': {source}", path.display())]
    FxDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No home directory to look for fx definitions in")]
    NoHomeDirectory,
}

impl ProjectError {
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ProjectError::Read { path, .. }
            | ProjectError::Write { path, .. }
            | ProjectError::FxDirectory { path, .. } => Some(path),
            ProjectError::NoHomeDirectory => None,
        }
    }
}
