//! Names for saved output: archive stems from job names, on-disk names for single items.

mod path;
mod sanitize;

pub use path::name_from_url;
pub use sanitize::{
    sanitize_filename_for_linux, sanitize_job_name, DEFAULT_JOB_NAME_MAX, FALLBACK_JOB_NAME,
};

/// Default filename when neither the display name nor the URL yields anything usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a safe on-disk filename for one saved item.
///
/// Prefers `display_name`; falls back to the last segment of `url`. The result is
/// sanitized for Linux; reserved or empty names become `"download.bin"`.
pub fn derive_save_name(display_name: &str, url: Option<&str>) -> String {
    let from_display = sanitize_filename_for_linux(display_name);
    if is_usable(&from_display) {
        return from_display;
    }
    let from_url = url
        .and_then(name_from_url)
        .map(|n| sanitize_filename_for_linux(&n))
        .filter(|n| is_usable(n));
    from_url.unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

fn is_usable(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_display_name() {
        assert_eq!(
            derive_save_name("IMG_1.jpg", Some("https://cdn.example.com/k/abc.jpg")),
            "IMG_1.jpg"
        );
    }

    #[test]
    fn falls_back_to_url_segment() {
        assert_eq!(
            derive_save_name("  ", Some("https://cdn.example.com/k/abc.jpg?sig=1")),
            "abc.jpg"
        );
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(derive_save_name("..", None), "download.bin");
        assert_eq!(
            derive_save_name("", Some("https://cdn.example.com/")),
            "download.bin"
        );
    }
}
