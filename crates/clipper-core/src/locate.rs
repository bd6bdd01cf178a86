//! Section locator.
//!
//! Given a document and a category name, finds where a new entry for that
//! category belongs: at the end of the category's `## <name>` section,
//! right before the next level-2 heading. If the section does not exist
//! it is appended to the document first.
//!
//! Two strategies are available:
//!
//! | Strategy | Matching |
//! |----------|----------|
//! | [`LocateStrategy::Substring`] | Raw substring search for `## <name>` and `\n## ` |
//! | [`LocateStrategy::Structural`] | Whole-line heading match, fenced code skipped |
//!
//! `Substring` is the default and reproduces the historical document
//! format byte-for-byte, including its blind spots: `## Tools` also
//! matches inside a code block, inside `### Tools`, and as a prefix of
//! `## Tools & More`. `Structural` fixes those cases but may place
//! entries differently in documents that relied on them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocateStrategy {
    #[default]
    Substring,
    Structural,
}

/// Result of locating an insertion point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// The document, with the category heading appended if it was missing.
    pub document: String,
    /// Byte offset into `document` where the entry should be spliced.
    pub offset: usize,
    /// Whether the category heading had to be appended.
    pub created: bool,
}

/// Locate the insertion point for `category` using the given strategy.
pub fn locate_insertion_point(document: &str, category: &str, strategy: LocateStrategy) -> Located {
    match strategy {
        LocateStrategy::Substring => locate_substring(document, category),
        LocateStrategy::Structural => locate_structural(document, category),
    }
}

fn section_header(category: &str) -> String {
    format!("## {}", category)
}

fn append_section(document: &str, category: &str) -> Located {
    let document = format!("{}\n\n{}\n\n", document, section_header(category));
    let offset = document.len();
    Located {
        document,
        offset,
        created: true,
    }
}

fn locate_substring(document: &str, category: &str) -> Located {
    let header = section_header(category);
    let Some(start) = document.find(&header) else {
        return append_section(document, category);
    };

    let line_end = document[start..]
        .find('\n')
        .map(|i| start + i)
        .unwrap_or(document.len());

    let offset = document[line_end..]
        .find("\n## ")
        .map(|i| line_end + i)
        .unwrap_or(document.len());

    Located {
        document: document.to_string(),
        offset,
        created: false,
    }
}

/// Tracks fenced code blocks while walking lines.
#[derive(Default)]
struct FenceState {
    marker: Option<char>,
}

impl FenceState {
    /// Feed one line; returns true if the line is part of a fence
    /// (including the opening and closing lines).
    fn observe(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let opener = if trimmed.starts_with("```") {
            Some('`')
        } else if trimmed.starts_with("~~~") {
            Some('~')
        } else {
            None
        };

        match (self.marker, opener) {
            (None, Some(c)) => {
                self.marker = Some(c);
                true
            }
            (Some(open), Some(c)) if open == c => {
                self.marker = None;
                true
            }
            (Some(_), _) => true,
            (None, None) => false,
        }
    }
}

fn locate_structural(document: &str, category: &str) -> Located {
    let header = section_header(category);
    let mut fence = FenceState::default();
    let mut in_section = false;
    let mut line_start = 0usize;

    for line in document.split_inclusive('\n') {
        let this_start = line_start;
        line_start += line.len();

        if fence.observe(line) {
            continue;
        }

        let content = line.trim_end_matches(['\n', '\r']);
        if in_section {
            if content.starts_with("## ") {
                // Insert before the line break that ends the previous line.
                let mut offset = this_start.saturating_sub(1);
                if offset > 0 && document.as_bytes()[offset - 1] == b'\r' {
                    offset -= 1;
                }
                return Located {
                    document: document.to_string(),
                    offset,
                    created: false,
                };
            }
        } else if content.trim_end() == header {
            in_section = true;
        }
    }

    if in_section {
        Located {
            document: document.to_string(),
            offset: document.len(),
            created: false,
        }
    } else {
        append_section(document, category)
    }
}

/// Names of the level-2 sections in `document`, in order, skipping
/// fenced code.
pub fn section_names(document: &str) -> Vec<String> {
    let mut fence = FenceState::default();
    document
        .lines()
        .filter(|line| !fence.observe(line))
        .filter_map(|line| line.strip_prefix("## "))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# KB\n\n## Tools\n\n### A\n- a\n\n## Books\n\n### C\n- c";

    #[test]
    fn test_missing_section_is_appended() {
        let located = locate_insertion_point("# KB", "New", LocateStrategy::Substring);
        assert!(located.created);
        assert_eq!(located.document, "# KB\n\n## New\n\n");
        assert_eq!(located.offset, located.document.len());
    }

    #[test]
    fn test_existing_section_stops_before_next() {
        let located = locate_insertion_point(DOC, "Tools", LocateStrategy::Substring);
        assert!(!located.created);
        assert_eq!(located.document, DOC);
        assert!(located.document[located.offset..].starts_with("\n## Books"));
        assert!(located.document[..located.offset].ends_with("- a\n"));
    }

    #[test]
    fn test_last_section_inserts_at_end() {
        let located = locate_insertion_point(DOC, "Books", LocateStrategy::Substring);
        assert_eq!(located.offset, DOC.len());
    }

    #[test]
    fn test_substring_matches_inside_code_block() {
        let doc = "# KB\n\n```\n## Tools\n```\n\n## Other\n";
        let located = locate_insertion_point(doc, "Tools", LocateStrategy::Substring);
        assert!(!located.created);
        assert!(located.offset < doc.find("## Other").unwrap());
    }

    #[test]
    fn test_substring_matches_level_three_lookalike() {
        let doc = "# KB\n\n## Misc\n\n### Tools\n- t";
        let located = locate_insertion_point(doc, "Tools", LocateStrategy::Substring);
        assert!(!located.created);
    }

    #[test]
    fn test_structural_ignores_code_block() {
        let doc = "# KB\n\n```\n## Tools\n```\n\n## Other\n";
        let located = locate_insertion_point(doc, "Tools", LocateStrategy::Structural);
        assert!(located.created);
        assert!(located.document.ends_with("## Tools\n\n"));
    }

    #[test]
    fn test_structural_ignores_level_three_and_prefix() {
        let doc = "# KB\n\n## Tools & More\n\n### Tools\n- t";
        let located = locate_insertion_point(doc, "Tools", LocateStrategy::Structural);
        assert!(located.created);
    }

    #[test]
    fn test_structural_section_end_skips_fenced_heading() {
        let doc = "# KB\n\n## Tools\n\n```md\n## Not a section\n```\n\n## Books\n";
        let located = locate_insertion_point(doc, "Tools", LocateStrategy::Structural);
        assert!(!located.created);
        assert!(located.document[located.offset..].starts_with("\n## Books"));
    }

    #[test]
    fn test_strategies_agree_on_plain_documents() {
        for category in ["Tools", "Books", "Missing"] {
            assert_eq!(
                locate_insertion_point(DOC, category, LocateStrategy::Substring),
                locate_insertion_point(DOC, category, LocateStrategy::Structural),
                "strategies differ for {}",
                category
            );
        }
    }

    #[test]
    fn test_structural_keeps_crlf_line_breaks_intact() {
        let doc = "# KB\r\n\r\n## Tools\r\n\r\n### rg\r\n\r\n## Books\r\n";
        let located = locate_insertion_point(doc, "Tools", LocateStrategy::Structural);
        assert!(doc[..located.offset].ends_with("### rg\r\n"));
        assert!(doc[located.offset..].starts_with("\r\n## Books"));
    }

    #[test]
    fn test_multibyte_category() {
        let doc = "# 知识库\n\n## 工具\n\n### A\n- a\n\n## 书籍\n";
        let located = locate_insertion_point(doc, "工具", LocateStrategy::Substring);
        assert!(doc.is_char_boundary(located.offset));
        assert!(located.document[located.offset..].starts_with("\n## 书籍"));
    }

    #[test]
    fn test_section_names() {
        let doc = "# KB\n\n## Tools\n\n### A\n\n```\n## Fake\n```\n\n## Books \n";
        assert_eq!(section_names(doc), vec!["Tools", "Books"]);
    }
}
