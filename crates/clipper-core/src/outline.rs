//! Heading indexer.
//!
//! Turns the headings reported by the renderer into a navigable outline.
//! Each heading gets an id derived from its text (`h-` + the first 32 hex
//! digits of the SHA-256 of the trimmed text), so the same heading keeps
//! the same anchor across renders. Duplicate texts are disambiguated with
//! a counter suffix: `h-…`, `h-…-1`, `h-…-2`.
//!
//! The hash is an identifier generator, not a security primitive.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::models::{HeadingIndexEntry, OutlineNode, RenderedHeading};

const ID_HEX_LEN: usize = 32;

/// Base id for a heading text, before collision handling.
pub fn heading_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("h-{}", &digest[..ID_HEX_LEN])
}

/// Assign unique ids to a sequence of rendered headings, in order.
pub fn build_outline(headings: &[RenderedHeading]) -> Vec<HeadingIndexEntry> {
    let mut used: HashSet<String> = HashSet::with_capacity(headings.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut outline = Vec::with_capacity(headings.len());

    for heading in headings {
        let base = heading_id(&heading.text);
        let id = if used.contains(&base) {
            let counter = counters.entry(base.clone()).or_insert(0);
            loop {
                *counter += 1;
                let candidate = format!("{}-{}", base, counter);
                if !used.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            base
        };

        used.insert(id.clone());
        outline.push(HeadingIndexEntry {
            id,
            text: heading.text.trim().to_string(),
            level: heading.level.clamp(1, 6),
        });
    }

    outline
}

/// Group level-3+ headings under the nearest preceding level-2 heading.
///
/// Level-1 and level-2 headings are top-level nodes. A level-1 heading
/// closes the open level-2 group. Level-3+ headings with no open group
/// become top-level nodes without children.
pub fn build_tree(outline: &[HeadingIndexEntry]) -> Vec<OutlineNode> {
    let mut nodes: Vec<OutlineNode> = Vec::new();
    let mut open_group: Option<usize> = None;

    for entry in outline {
        match entry.level {
            1 => {
                open_group = None;
                nodes.push(leaf(entry));
            }
            2 => {
                nodes.push(leaf(entry));
                open_group = Some(nodes.len() - 1);
            }
            _ => match open_group {
                Some(idx) => nodes[idx].children.push(entry.clone()),
                None => nodes.push(leaf(entry)),
            },
        }
    }

    nodes
}

fn leaf(entry: &HeadingIndexEntry) -> OutlineNode {
    OutlineNode {
        heading: entry.clone(),
        children: Vec::new(),
    }
}
