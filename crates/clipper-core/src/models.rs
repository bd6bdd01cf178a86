//! Core data models used throughout Clipper.
//!
//! A [`ResourceEntry`] is transient: it is built from user input, rendered
//! into a Markdown snippet, and dropped. The persisted form of the
//! knowledge base is the Markdown document itself.

use serde::Serialize;

/// Default scheme prepended to a bare domain.
pub const DEFAULT_PROTOCOL: &str = "https://";

/// One curated resource, ready to be rendered into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub title: String,
    pub summary: String,
    pub website_url: String,
    pub github_url: Option<String>,
    pub category: String,
}

impl ResourceEntry {
    /// The GitHub link, falling back to the website when none was given.
    pub fn github_or_website(&self) -> &str {
        match self.github_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => &self.website_url,
        }
    }
}

/// Possibly-incomplete entry input, as collected from the command line.
///
/// The website URL is either given whole or assembled from a protocol
/// and a domain.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub title: String,
    pub summary: String,
    pub protocol: Option<String>,
    pub domain: Option<String>,
    pub website_url: Option<String>,
    pub github_url: Option<String>,
    pub category: Option<String>,
}

impl EntryDraft {
    /// Resolve the website URL. An explicit URL wins over protocol + domain.
    /// Returns an empty string when neither is present.
    pub fn website_url(&self) -> String {
        if let Some(url) = self.website_url.as_deref().map(str::trim) {
            if !url.is_empty() {
                return url.to_string();
            }
        }
        match self.domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() => {
                let protocol = self
                    .protocol
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .unwrap_or(DEFAULT_PROTOCOL);
                format!("{}{}", protocol, domain)
            }
            _ => String::new(),
        }
    }

    /// Convert to a [`ResourceEntry`] without validating it.
    pub fn to_entry(&self) -> ResourceEntry {
        ResourceEntry {
            title: self.title.trim().to_string(),
            summary: self.summary.trim().to_string(),
            website_url: self.website_url(),
            github_url: self
                .github_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            category: self.category.as_deref().unwrap_or("").trim().to_string(),
        }
    }
}

/// A heading as reported by the Markdown renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHeading {
    pub text: String,
    pub level: u8,
}

impl RenderedHeading {
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

/// A navigable heading with a stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingIndexEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Two-level projection of the outline: a top-level heading and the
/// level-3+ headings grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    #[serde(flatten)]
    pub heading: HeadingIndexEntry,
    pub children: Vec<HeadingIndexEntry>,
}
