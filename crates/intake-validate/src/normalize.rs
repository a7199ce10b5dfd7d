//! Header normalization.

/// Canonical comparison key for a column header.
///
/// Drops everything except ASCII letters, digits, spaces and underscores,
/// trims, collapses space runs to a single space and lowercases. The key
/// is only used for matching and never shown to users.
pub fn normalize_header(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == ' ' || *ch == '_')
        .collect();

    let mut key = String::with_capacity(kept.len());
    let mut previous_space = false;
    for ch in kept.trim().chars() {
        if ch == ' ' {
            if previous_space {
                continue;
            }
            previous_space = true;
        } else {
            previous_space = false;
        }
        key.push(ch.to_ascii_lowercase());
    }
    key
}
