//! Fallback values applied when a create request omits a field.
//!
//! Nothing is ever rejected for being empty; it is defaulted instead.

/// Name given to a folder created without one.
pub const DEFAULT_FOLDER_NAME: &str = "New Folder";

/// Title given to a note created without one.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

/// Resolve the name of a folder being created.
///
/// ```
/// use leafnote_core::defaults::folder_name_or_default;
///
/// assert_eq!(folder_name_or_default(Some("Work")), "Work");
/// assert_eq!(folder_name_or_default(Some("   ")), "New Folder");
/// assert_eq!(folder_name_or_default(None), "New Folder");
/// ```
pub fn folder_name_or_default(name: Option<&str>) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => DEFAULT_FOLDER_NAME.to_string(),
    }
}

/// The name a rename request actually asks for, ignoring blank input.
pub fn requested_folder_name(requested: Option<&str>) -> Option<&str> {
    requested.filter(|n| !n.trim().is_empty())
}

/// Resolve a folder rename. A missing or blank name keeps the current one.
pub fn renamed_folder_name(current: &str, requested: Option<&str>) -> String {
    requested_folder_name(requested)
        .unwrap_or(current)
        .to_string()
}

/// Resolve the title of a note being created.
pub fn note_title_or_default(title: Option<&str>) -> String {
    match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_NOTE_TITLE.to_string(),
    }
}

/// Title to show for a note, e.g. on its public page.
pub fn display_title(title: &str) -> &str {
    if title.is_empty() {
        DEFAULT_NOTE_TITLE
    } else {
        title
    }
}
