//! Filename sanitization: job names for archive files, display names for disk saves.

/// Default bound on a sanitized job name, in characters.
pub const DEFAULT_JOB_NAME_MAX: usize = 100;

/// Used when a job name sanitizes to nothing.
pub const FALLBACK_JOB_NAME: &str = "download";

/// Sanitizes a job name for use as an archive filename stem.
///
/// - Drops every character outside `[A-Za-z0-9 _-]`
/// - Replaces each whitespace run with a single `_`
/// - Truncates to `max_len` characters; empty results become `"download"`
pub fn sanitize_job_name(name: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_space = false;
        }
    }

    let trimmed: String = out.chars().take(max_len.max(1)).collect();
    if trimmed.is_empty() {
        FALLBACK_JOB_NAME.to_string()
    } else {
        trimmed
    }
}

/// Sanitizes a display name for saving on Linux.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Trims leading/trailing spaces, dots and underscores
/// - Collapses consecutive underscores
/// - Limits length to 255 bytes (Linux NAME_MAX)
pub fn sanitize_filename_for_linux(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = c == '\0' || c == '/' || c == '\\' || c.is_control();
        if unsafe_char || c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_name_strips_and_collapses() {
        assert_eq!(
            sanitize_job_name("Smith Wedding   2024!", 100),
            "Smith_Wedding_2024"
        );
        assert_eq!(sanitize_job_name("a\t\nb", 100), "a_b");
        assert_eq!(sanitize_job_name("../../etc/passwd", 100), "etcpasswd");
    }

    #[test]
    fn job_name_keeps_dash_and_underscore() {
        assert_eq!(sanitize_job_name("proofs-v2_final", 100), "proofs-v2_final");
    }

    #[test]
    fn job_name_keeps_edge_underscores_and_spaces() {
        assert_eq!(sanitize_job_name("__init__", 100), "__init__");
        assert_eq!(sanitize_job_name(" trip", 100), "_trip");
        assert_eq!(sanitize_job_name("trip  ", 100), "trip_");
        // Dropped characters do not split a whitespace run.
        assert_eq!(sanitize_job_name("  ★★★  ", 100), "_");
    }

    #[test]
    fn job_name_truncates() {
        let long = "x".repeat(300);
        assert_eq!(sanitize_job_name(&long, 100).len(), 100);
        assert_eq!(sanitize_job_name("abcdef", 3), "abc");
    }

    #[test]
    fn job_name_empty_falls_back() {
        assert_eq!(sanitize_job_name("", 100), "download");
        assert_eq!(sanitize_job_name("★★★", 100), "download");
    }

    #[test]
    fn display_name_removes_separators() {
        assert_eq!(sanitize_filename_for_linux("a/b\\c.jpg"), "a_b_c.jpg");
    }

    #[test]
    fn display_name_trims_dots_and_spaces() {
        assert_eq!(sanitize_filename_for_linux("  ..  photo.jpg  ..  "), "photo.jpg");
    }

    #[test]
    fn display_name_collapses_underscores_and_controls() {
        assert_eq!(sanitize_filename_for_linux("img___01.jpg"), "img_01.jpg");
        assert_eq!(sanitize_filename_for_linux("img\x00\x01.jpg"), "img_.jpg");
    }

    #[test]
    fn display_name_keeps_spaces_inside() {
        assert_eq!(sanitize_filename_for_linux("Beach day.jpg"), "Beach day.jpg");
    }
}
