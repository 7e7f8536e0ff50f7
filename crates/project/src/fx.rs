//! Discovery of user-supplied effect definitions.
//!
//! Effects live as `.js` files under `~/.automaton/fxs`, possibly nested in
//! subdirectories. Only their locations are collected here; loading the code
//! is up to the editor.

use crate::ProjectError;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Effect name (`/`-separated path relative to the fx root, without `.js`)
/// mapped to the file that defines it.
pub type FxDefinitions = BTreeMap<String, PathBuf>;

const FX_EXTENSION: &str = "js";

pub fn default_fx_directory() -> Result<PathBuf, ProjectError> {
    dirs::home_dir()
        .map(|home| home.join(".automaton").join("fxs"))
        .ok_or(ProjectError::NoHomeDirectory)
}

/// Collect every effect definition under `root`, creating the directory first
/// if it does not exist yet.
pub fn load_fx_definitions(root: &Path) -> Result<FxDefinitions, ProjectError> {
    let fx_dir_error = |source| ProjectError::FxDirectory {
        path: root.to_path_buf(),
        source,
    };

    fs::create_dir_all(root).map_err(fx_dir_error)?;

    let mut definitions = FxDefinitions::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(fx_dir_error(err.into_io_error().unwrap_or_else(|| {
                    io::Error::other("fx directory loops back on itself")
                })));
            }
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable fx entry");
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != FX_EXTENSION) {
            continue;
        }
        if let Some(name) = fx_name(root, path) {
            definitions.insert(name, path.to_path_buf());
        }
    }

    tracing::debug!(
        root = %root.display(),
        count = definitions.len(),
        "loaded fx definitions"
    );
    Ok(definitions)
}

fn fx_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}
