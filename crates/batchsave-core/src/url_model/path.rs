//! Name hints from a resolved media URL.

/// Last non-empty path segment of `url`, ignoring query and fragment (signed CDN URLs).
///
/// `None` if the URL does not parse or has no usable segment.
pub fn name_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .last()
        .map(str::to_string)
}
