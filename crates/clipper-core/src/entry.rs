//! Entry renderer.
//!
//! Formats one [`ResourceEntry`] as a level-3 heading followed by a single
//! bullet line. User text is inserted verbatim; Markdown special
//! characters in the title or summary are not escaped.
//!
//! ```rust
//! use clipper_core::entry::render_entry;
//! use clipper_core::ResourceEntry;
//!
//! let entry = ResourceEntry {
//!     title: "B".into(),
//!     summary: "b".into(),
//!     website_url: "https://b.x".into(),
//!     github_url: None,
//!     category: "Tools".into(),
//! };
//! assert_eq!(
//!     render_entry(&entry),
//!     "### B\n- b 🔗 [官网](https://b.x) ｜ [GitHub](https://b.x)"
//! );
//! ```

use crate::models::ResourceEntry;

/// Render a single entry. No trailing newline.
pub fn render_entry(entry: &ResourceEntry) -> String {
    format!(
        "### {}\n- {} 🔗 [官网]({}) ｜ [GitHub]({})",
        entry.title,
        entry.summary,
        entry.website_url,
        entry.github_or_website()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(github: Option<&str>) -> ResourceEntry {
        ResourceEntry {
            title: "Ripgrep".into(),
            summary: "fast grep".into(),
            website_url: "https://rg.dev".into(),
            github_url: github.map(str::to_string),
            category: "Tools".into(),
        }
    }

    #[test]
    fn test_render_with_github() {
        let out = render_entry(&entry(Some("https://github.com/BurntSushi/ripgrep")));
        assert_eq!(
            out,
            "### Ripgrep\n- fast grep 🔗 [官网](https://rg.dev) ｜ [GitHub](https://github.com/BurntSushi/ripgrep)"
        );
    }

    #[test]
    fn test_render_no_trailing_newline() {
        assert!(!render_entry(&entry(None)).ends_with('\n'));
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut e = entry(None);
        e.title = "*bold* [x]".into();
        assert!(render_entry(&e).starts_with("### *bold* [x]\n"));
    }
}
