use std::sync::LazyLock;

use regex::Regex;

/// Converts a term into a name safe to be used as a file stem and as a wiki link target.
///
/// Path separators, characters rejected by common filesystems, control characters and characters with a meaning
/// inside `[[...]]` links are replaced by a hyphen. Surrounding whitespace is removed.
///
/// Returns [None] if nothing usable remains, like an empty term or one made only of dots.
///
/// # Examples
///
/// ```rust
/// # use glossary_linker::utils::sanitize_file_stem;
/// assert_eq!(sanitize_file_stem(" TCP/IP "), Some(String::from("TCP-IP")));
/// assert_eq!(sanitize_file_stem("C++"), Some(String::from("C++")));
/// assert_eq!(sanitize_file_stem(".."), None);
/// ```
pub fn sanitize_file_stem(term: impl AsRef<str>) -> Option<String> {
    /// Regex to match the characters that can't be part of a note name
    static FORBIDDEN_STEM_CHARS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|#^\[\]\p{Cc}]"#).unwrap());

    let sanitized = FORBIDDEN_STEM_CHARS.replace_all(term.as_ref().trim(), "-");
    let sanitized = sanitized.trim();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        None
    } else {
        Some(sanitized.to_string())
    }
}

/// Splits a `/`-separated vault path into its non-empty segments, trimming each of them
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').map(str::trim).filter(|s| !s.is_empty())
}
