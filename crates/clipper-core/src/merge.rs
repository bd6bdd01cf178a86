//! Merge engine.
//!
//! Combines the [entry renderer](crate::entry) and the
//! [section locator](crate::locate) to splice a new entry into the
//! document, then normalizes blank lines.
//!
//! # Algorithm
//!
//! 1. Validate that `title`, `summary`, `website_url`, and `category`
//!    are non-blank.
//! 2. Render the entry snippet.
//! 3. Locate the insertion offset (appending the `## <category>` heading
//!    if the section is missing).
//! 4. Splice as `before + "\n\n" + snippet + "\n\n" + after`.
//! 5. Trim the whole document and collapse every run of 3+ newlines to
//!    exactly two.
//!
//! The same path computes previews, with placeholder text standing in
//! for blank fields.

use crate::entry::render_entry;
use crate::error::{ClipperError, Result};
use crate::locate::{locate_insertion_point, LocateStrategy};
use crate::models::{EntryDraft, ResourceEntry};

pub const TITLE_PLACEHOLDER: &str = "(title pending)";
pub const SUMMARY_PLACEHOLDER: &str = "(summary pending)";
pub const URL_PLACEHOLDER: &str = "https://example.com";

/// Check that every required field is present.
pub fn validate_entry(entry: &ResourceEntry) -> Result<()> {
    let mut missing = Vec::new();
    if entry.title.trim().is_empty() {
        missing.push("title");
    }
    if entry.summary.trim().is_empty() {
        missing.push("summary");
    }
    if entry.website_url.trim().is_empty() {
        missing.push("website_url");
    }
    if entry.category.trim().is_empty() {
        missing.push("category");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ClipperError::Validation { missing })
    }
}

/// Insert `entry` at the end of its category section and return the new
/// document. The input document is not modified.
pub fn apply_entry(document: &str, entry: &ResourceEntry, strategy: LocateStrategy) -> Result<String> {
    validate_entry(entry)?;
    Ok(splice(document, entry, strategy))
}

fn splice(document: &str, entry: &ResourceEntry, strategy: LocateStrategy) -> String {
    let snippet = render_entry(entry);
    let located = locate_insertion_point(document, &entry.category, strategy);
    let (before, after) = located.document.split_at(located.offset);

    let mut merged = String::with_capacity(located.document.len() + snippet.len() + 4);
    merged.push_str(before);
    merged.push_str("\n\n");
    merged.push_str(&snippet);
    merged.push_str("\n\n");
    merged.push_str(after);

    normalize_document(&merged)
}

/// Overlay a possibly-incomplete draft on the document for display.
///
/// Blank title, summary, and website URL are replaced with placeholders.
/// A draft without a category has nowhere to go, so the document is
/// returned normalized but otherwise unchanged. Never fails.
pub fn preview_document(document: &str, draft: &EntryDraft, strategy: LocateStrategy) -> String {
    let mut entry = draft.to_entry();
    if entry.category.is_empty() {
        return normalize_document(document);
    }
    if entry.title.is_empty() {
        entry.title = TITLE_PLACEHOLDER.to_string();
    }
    if entry.summary.is_empty() {
        entry.summary = SUMMARY_PLACEHOLDER.to_string();
    }
    if entry.website_url.is_empty() {
        entry.website_url = URL_PLACEHOLDER.to_string();
    }
    splice(document, &entry, strategy)
}

/// Trim the document and collapse runs of three or more newlines to two.
pub fn normalize_document(text: &str) -> String {
    let trimmed = text.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut newlines = 0usize;

    for c in trimmed.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }
    out
}
