//! # Clipper
//!
//! **A local-first Markdown knowledge base curator.**
//!
//! Clipper keeps a single Markdown document of curated resources, grouped
//! into categories (`## <category>` sections) with one `### <title>` entry
//! per resource. Entries are spliced into the right section, the document
//! is persisted in SQLite, and it can be mirrored to a GitHub README,
//! rendered to HTML with a navigable outline, or exported as a file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │  CLI (clip) │──▶│ clipper-core │──▶│  SQLite  │
//! │             │   │ merge/outline│   │  kv table│
//! └─────────────┘   └──────┬───────┘   └──────────┘
//!                          │
//!                 ┌────────┴────────┐
//!                 ▼                 ▼
//!           ┌──────────┐      ┌──────────┐
//!           │  GitHub  │      │ Renderer │
//!           │ contents │      │ (cmark)  │
//!           └──────────┘      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! clip init
//! clip add --title ripgrep --summary "fast grep" --domain github.com/BurntSushi/ripgrep --category "Developer Tools"
//! clip outline --tree
//! clip export --output kb.md
//! clip push                     # requires [github] and GITHUB_TOKEN
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Key-value schema creation (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of [`clipper_core::store::KvStore`] |
//! | [`github`] | GitHub contents API implementation of [`clipper_core::mirror::Mirror`] |
//! | [`render`] | Heading extraction and HTML rendering |
//! | [`export`] | Markdown file export |
//! | [`commands`] | CLI command implementations |

pub mod commands;
pub mod config;
pub mod db;
pub mod export;
pub mod github;
pub mod migrate;
pub mod render;
pub mod sqlite_store;

pub use clipper_core::{document, store};
