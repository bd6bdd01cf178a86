//! Persistent key-value storage abstraction.
//!
//! The [`KvStore`] trait is the only way the core reads or writes
//! persisted state. The native binary provides a SQLite implementation;
//! [`memory::InMemoryKvStore`] backs tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Key holding the full Markdown document.
pub const DOCUMENT_KEY: &str = "clipper.document";
/// Key holding the JSON-encoded, ordered category list.
pub const CATEGORIES_KEY: &str = "clipper.categories";
/// Key holding the currently selected category.
pub const SELECTED_CATEGORY_KEY: &str = "clipper.selected_category";

/// Cache key for one `(owner, repo)` pair.
pub fn cache_key(owner: &str, repo: &str) -> String {
    format!("clipper.cache.{}/{}", owner, repo)
}

/// Abstract string key-value store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](KvStore::get) | Read a value, `None` when absent |
/// | [`set`](KvStore::set) | Insert or overwrite a value |
/// | [`remove`](KvStore::remove) | Delete a value; absent keys are not an error |
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}
