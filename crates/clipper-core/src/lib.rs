//! # Clipper Core
//!
//! Shared, runtime-agnostic logic for Clipper: the knowledge-base
//! document model, the entry merge engine, the heading outline, and the
//! store and mirror abstractions the native binary plugs into.
//!
//! This crate contains no tokio, sqlx, HTTP client, or filesystem I/O.
//! Everything that touches the outside world goes through
//! [`store::KvStore`] or [`mirror::Mirror`].
//!
//! ## Data Flow
//!
//! ```text
//! EntryDraft ──▶ entry::render_entry ──▶ merge::apply_entry ──▶ KnowledgeBase
//!                                            │
//!                                 locate::locate_insertion_point
//!
//! rendered headings ──▶ outline::build_outline ──▶ outline::build_tree
//! ```

pub mod cache;
pub mod category;
pub mod document;
pub mod entry;
pub mod error;
pub mod locate;
pub mod merge;
pub mod mirror;
pub mod models;
pub mod outline;
pub mod store;
pub mod sync;

pub use error::{ClipperError, RemoteFailure};
pub use locate::LocateStrategy;
pub use models::{EntryDraft, HeadingIndexEntry, OutlineNode, RenderedHeading, ResourceEntry};
