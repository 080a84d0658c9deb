//! Dockerfile parsing utilities

use regex::Regex;

/// Returns the image named by the first `FROM` line of `content`.
///
/// The keyword is matched case-insensitively and must start the line; the
/// rest of the line, trimmed, is the image reference.
pub fn parse_base_image(content: &str) -> Option<&str> {
    let from_re = Regex::new(r"(?im)^FROM[ \t]+(.+)$").expect("valid regex");

    from_re
        .captures(content)
        .and_then(|cap| cap.get(1))
        .map(|image| image.as_str().trim())
        .filter(|image| !image.is_empty())
}

/// Compares a declared base image with the target, ignoring case.
pub fn same_image(declared: &str, target: &str) -> bool {
    declared.to_lowercase() == target.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_image() {
        let content = r#"
# syntax=docker/dockerfile:1
FROM python:3.9
RUN pip install flask
FROM scratch
"#;
        assert_eq!(parse_base_image(content), Some("python:3.9"));
    }

    #[test]
    fn test_lowercase_keyword() {
        assert_eq!(parse_base_image("from node:18\n"), Some("node:18"));
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            parse_base_image("FROM alpine:3.18\r\nRUN true\r\n"),
            Some("alpine:3.18")
        );
    }

    #[test]
    fn test_indented_or_missing_declaration() {
        assert_eq!(parse_base_image("  FROM alpine\n"), None);
        assert_eq!(parse_base_image("RUN echo FROM alpine\n"), None);
        assert_eq!(parse_base_image(""), None);
        assert_eq!(parse_base_image("FROMalpine\n"), None);
    }

    #[test]
    fn test_same_image_ignores_case() {
        assert!(same_image("Alpine:3.18", "alpine:3.18"));
        assert!(same_image("python:3.9", "PYTHON:3.9"));
        assert!(!same_image("python:3.9", "python:3.10"));
        assert!(!same_image("python:3.9 AS build", "python:3.9"));
    }
}
