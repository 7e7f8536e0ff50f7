use std::path::Path;

pub const APP_TITLE: &str = "Automaton";

/// Prefix shown while the document has unsaved changes.
pub const DIRTY_MARKER: &str = "* ";

/// Window title for a document at `path` (if any) with the given dirtiness.
///
/// `Automaton`, `/work/intro.json - Automaton`, `* /work/intro.json - Automaton`.
pub fn window_title(path: Option<&Path>, dirty: bool) -> String {
    let mut title = match path {
        Some(path) => format!("{} - {APP_TITLE}", path.display()),
        None => APP_TITLE.to_string(),
    };

    if dirty {
        title.insert_str(0, DIRTY_MARKER);
    }

    title
}
