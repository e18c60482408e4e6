//! The advisor page.
//!
//! A single self-contained HTML file (inline CSS and JavaScript) embedded at
//! compile time, so the binary has no runtime file dependencies. It opens a
//! session, offers the crop selector, and renders the transcript in the
//! order the server returns it.

/// The complete page served at `/`.
pub const PAGE_HTML: &str = include_str!("../assets/index.html");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_is_complete_document() {
        assert!(PAGE_HTML.starts_with("<!DOCTYPE html>"));
        assert!(PAGE_HTML.contains("</html>"));
    }

    #[test]
    fn test_page_has_controls() {
        assert!(PAGE_HTML.contains("id=\"crop-select\""));
        assert!(PAGE_HTML.contains("id=\"question\""));
        assert!(PAGE_HTML.contains("id=\"transcript\""));
    }

    #[test]
    fn test_page_uses_session_api() {
        assert!(PAGE_HTML.contains("/api/crops"));
        assert!(PAGE_HTML.contains("/api/sessions"));
    }

    #[test]
    fn test_page_has_no_external_resources() {
        assert!(!PAGE_HTML.contains("<script src="));
        assert!(!PAGE_HTML.contains("<link rel=\"stylesheet\""));
    }
}
