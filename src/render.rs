//! Markdown rendering via `pulldown-cmark`.
//!
//! The core never parses Markdown. This module is the renderer
//! collaborator: it reports the document's headings in order so the
//! [outline](clipper_core::outline) can assign ids, and it renders HTML
//! with those ids attached to the heading tags so outline links resolve.

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use clipper_core::outline::{build_outline, build_tree};
use clipper_core::{HeadingIndexEntry, OutlineNode, RenderedHeading};

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

fn level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Headings in document order, with inline markup reduced to text.
pub fn extract_headings(markdown: &str) -> Vec<RenderedHeading> {
    let mut headings = Vec::new();
    let mut current: Option<(u8, String)> = None;

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level_to_u8(level), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = current.take() {
                    headings.push(RenderedHeading::new(text, level));
                }
            }
            _ => {}
        }
    }

    headings
}

/// Outline for a Markdown document.
pub fn outline(markdown: &str) -> Vec<HeadingIndexEntry> {
    build_outline(&extract_headings(markdown))
}

/// Render HTML with outline ids attached to every heading.
pub fn render_html(markdown: &str) -> (String, Vec<HeadingIndexEntry>) {
    let entries = outline(markdown);
    let mut ids = entries.iter().map(|e| e.id.clone());

    let events = Parser::new_ext(markdown, parser_options()).map(|event| match event {
        Event::Start(Tag::Heading {
            level,
            id: _,
            classes,
            attrs,
        }) => Event::Start(Tag::Heading {
            level,
            id: ids.next().map(CowStr::from),
            classes,
            attrs,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, events);
    (out, entries)
}

/// Standalone HTML page: navigation built from the outline tree, then the
/// rendered document.
pub fn render_page(title: &str, markdown: &str) -> String {
    let (body, entries) = render_html(markdown);
    let tree = build_tree(&entries);

    let mut nav = String::from("<nav class=\"toc\">\n<ul>\n");
    for node in &tree {
        push_nav_node(&mut nav, node);
    }
    nav.push_str("</ul>\n</nav>\n");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}<main>\n{}</main>\n</body>\n</html>\n",
        escape_html(title),
        nav,
        body
    )
}

fn push_nav_node(out: &mut String, node: &OutlineNode) {
    out.push_str(&format!(
        "<li><a href=\"#{}\">{}</a>",
        node.heading.id,
        escape_html(&node.heading.text)
    ));
    if !node.children.is_empty() {
        out.push_str("\n<ul>\n");
        for child in &node.children {
            out.push_str(&format!(
                "<li><a href=\"#{}\">{}</a></li>\n",
                child.id,
                escape_html(&child.text)
            ));
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</li>\n");
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipper_core::outline::heading_id;

    const DOC: &str = "# KB\n\n## Tools\n\n### `rg`\n- fast\n\n```\n## not a heading\n```\n\n## Books\n\n### A\n\n### A\n";

    #[test]
    fn test_extract_headings_skips_code_blocks() {
        let headings = extract_headings(DOC);
        let pairs: Vec<(&str, u8)> = headings.iter().map(|h| (h.text.as_str(), h.level)).collect();
        assert_eq!(
            pairs,
            vec![("KB", 1), ("Tools", 2), ("rg", 3), ("Books", 2), ("A", 3), ("A", 3)]
        );
    }

    #[test]
    fn test_render_html_attaches_ids() {
        let (html, entries) = render_html(DOC);
        assert_eq!(entries.len(), 6);
        assert!(html.contains(&format!("<h2 id=\"{}\">Tools</h2>", heading_id("Tools"))));
        assert!(html.contains(&format!("<h3 id=\"{}-1\">A</h3>", heading_id("A"))));
    }

    #[test]
    fn test_render_page_nav_follows_tree() {
        let page = render_page("My <KB>", DOC);
        assert!(page.contains("<title>My &lt;KB&gt;</title>"));
        assert!(page.contains(&format!("<a href=\"#{}\">Books</a>", heading_id("Books"))));
        let nav = page.split("<main>").next().unwrap();
        assert_eq!(nav.matches("<ul>").count(), 3);
    }
}
