//! Text helpers shared by notification builders.

const ELLIPSIS: &str = " ...";

/// Shorten `s` to at most `length` characters.
///
/// Strings that already fit are returned unchanged and a zero length yields
/// an empty string. Longer strings keep their first `length - 4` characters
/// followed by `" ..."`, so the result is exactly `length` characters long.
/// Lengths too small to hold the ellipsis fall back to a hard cut.
pub fn truncate_string_with_ellipses(s: &str, length: usize) -> String {
    if length == 0 {
        return String::new();
    }

    if s.chars().count() <= length {
        return s.to_string();
    }

    let marker = ELLIPSIS.chars().count();
    if length <= marker {
        return s.chars().take(length).collect();
    }

    let mut truncated: String = s.chars().take(length - marker).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
