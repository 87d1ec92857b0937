//! Track string normalization
//!
//! All rule matching (blacklist, pricing overrides, library boundary,
//! duplicate detection) compares whole strings after normalization.
//! Partial or fuzzy matching is deliberately not supported.

/// Normalize a song title or artist for matching: trim, strip punctuation,
/// collapse whitespace runs, lower-case.
///
/// The same normalization is applied at write time to populate the
/// `normalized_title` / `normalized_artist` columns, so stored rules and
/// incoming candidates always compare like-for-like.
pub fn normalize_track_string(text: &str) -> String {
    normalize_with_case(text, false)
}

/// Normalization variant used by duplicate detection when
/// `match_case_sensitive` is set: identical except the lower-casing step
/// is skipped.
pub fn normalize_with_case(text: &str, case_sensitive: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.trim().chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if c.is_alphanumeric() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            if case_sensitive {
                out.push(c);
            } else {
                out.extend(c.to_lowercase());
            }
        }
        // Punctuation is dropped entirely
    }

    out
}
