//! Filename sanitization and path derivation for downloaded images.

use std::path::{Component, Path, PathBuf};

use super::constants::IMAGE_EXTENSION;

/// Longest title (in UTF-8 bytes) kept in a filename; longer titles are cut.
///
/// Filesystems cap names at 255 bytes, and the extension must still fit.
const MAX_TITLE_BYTES: usize = 200;

/// Derives the run directory name from a search query.
///
/// Every space becomes an underscore, so `"pepperoni  pizza"` maps to
/// `"pepperoni__pizza"`. Separators and dot segments are sanitized like
/// titles, so the directory always sits directly under the output root.
#[must_use]
pub fn directory_name_for_query(query: &str) -> String {
    let name = sanitize_filename(&query.replace(' ', "_"));
    truncate_at_char_boundary(&name, MAX_TITLE_BYTES).to_string()
}

/// Builds `{directory}/{title}.png` for one search result.
///
/// The title is sanitized so it always names a file directly inside `directory`.
#[must_use]
pub fn image_path(directory: &Path, title: &str) -> PathBuf {
    let sanitized = sanitize_filename(title);
    let stem = truncate_at_char_boundary(&sanitized, MAX_TITLE_BYTES);
    directory.join(format!("{stem}.{IMAGE_EXTENSION}"))
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a char.
fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(index, c)| index + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// Sanitizes a filename by replacing path separators, reserved and control characters.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
