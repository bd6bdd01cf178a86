//! Document store and the add-entry workflow.
//!
//! [`KnowledgeBase`] ties the pure merge engine to a [`KvStore`]: it loads
//! the current document (seeding it on first run), applies entries,
//! persists the result, and keeps the category registry in step with the
//! sections the document contains.

use tracing::{debug, info};

use crate::category::CategoryRegistry;
use crate::error::Result;
use crate::locate::LocateStrategy;
use crate::merge::{apply_entry, normalize_document, preview_document};
use crate::models::EntryDraft;
use crate::store::{KvStore, DOCUMENT_KEY, SELECTED_CATEGORY_KEY};

/// Build the first-run document: a title and one empty section per
/// category.
pub fn seed_document(title: &str, categories: &[String]) -> String {
    let mut doc = format!("# {}", title.trim());
    for name in categories {
        doc.push_str("\n\n## ");
        doc.push_str(name);
    }
    doc
}

/// Settings that shape how the knowledge base is seeded and merged.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseOptions {
    pub title: String,
    pub default_categories: Vec<String>,
    pub strategy: LocateStrategy,
}

impl Default for KnowledgeBaseOptions {
    fn default() -> Self {
        Self {
            title: "Knowledge Base".to_string(),
            default_categories: vec![
                "AI Tools".to_string(),
                "Developer Tools".to_string(),
                "Design".to_string(),
                "Learning".to_string(),
            ],
            strategy: LocateStrategy::Substring,
        }
    }
}

/// Result of committing an entry.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub document: String,
    pub category: String,
    pub category_created: bool,
}

pub struct KnowledgeBase<'a> {
    store: &'a dyn KvStore,
    options: KnowledgeBaseOptions,
}

impl<'a> KnowledgeBase<'a> {
    pub fn new(store: &'a dyn KvStore, options: KnowledgeBaseOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &KnowledgeBaseOptions {
        &self.options
    }

    pub fn store(&self) -> &'a dyn KvStore {
        self.store
    }

    /// Seed the document and categories if they do not exist yet.
    ///
    /// Returns `true` if anything was written.
    pub async fn initialize(&self) -> Result<bool> {
        let mut wrote = false;
        if self.store.get(DOCUMENT_KEY).await?.is_none() {
            let doc = seed_document(&self.options.title, &self.options.default_categories);
            self.store.set(DOCUMENT_KEY, &doc).await?;
            wrote = true;
        }
        // Seeds the category list on first run.
        let registry = self.categories().await?;
        if self.store.get(SELECTED_CATEGORY_KEY).await?.is_none() {
            if let Some(first) = registry.names().first() {
                registry.select(self.store, first).await?;
                wrote = true;
            }
        }
        Ok(wrote)
    }

    /// The current document, seeding it if absent.
    pub async fn document(&self) -> Result<String> {
        match self.store.get(DOCUMENT_KEY).await? {
            Some(doc) => Ok(doc),
            None => {
                let doc = seed_document(&self.options.title, &self.options.default_categories);
                self.store.set(DOCUMENT_KEY, &doc).await?;
                Ok(doc)
            }
        }
    }

    /// The stored document, if any. Never seeds.
    pub async fn stored_document(&self) -> Result<Option<String>> {
        Ok(self.store.get(DOCUMENT_KEY).await?)
    }

    /// Replace the stored document, normalizing it first.
    pub async fn save_document(&self, document: &str) -> Result<String> {
        let normalized = normalize_document(document);
        self.store.set(DOCUMENT_KEY, &normalized).await?;
        debug!(bytes = normalized.len(), "document saved");
        Ok(normalized)
    }

    pub async fn categories(&self) -> Result<CategoryRegistry> {
        CategoryRegistry::load(self.store, &self.options.default_categories).await
    }

    /// Draft category, or the persisted selection when the draft has none.
    async fn resolve_category(&self, draft: &EntryDraft) -> Result<Option<String>> {
        match explicit_category(draft) {
            Some(name) => Ok(Some(name)),
            None => self.categories().await?.selected(self.store).await,
        }
    }

    /// Validate and commit an entry.
    ///
    /// On validation failure nothing is written. On success the document
    /// is saved, the category is registered if new, and it becomes the
    /// selected category.
    pub async fn add_entry(&self, draft: &EntryDraft) -> Result<AddOutcome> {
        let mut draft = draft.clone();
        draft.category = self.resolve_category(&draft).await?;
        let entry = draft.to_entry();

        let current = self.document().await?;
        let updated = apply_entry(&current, &entry, self.options.strategy)?;
        self.store.set(DOCUMENT_KEY, &updated).await?;

        let mut registry = self.categories().await?;
        let category_created = registry.add_if_absent(&entry.category);
        if category_created {
            registry.save(self.store).await?;
        }
        registry.select(self.store, &entry.category).await?;

        info!(title = %entry.title, category = %entry.category, "entry added");
        Ok(AddOutcome {
            document: updated,
            category: entry.category,
            category_created,
        })
    }

    /// Register a category without touching the document.
    pub async fn add_category(&self, name: &str) -> Result<bool> {
        let mut registry = self.categories().await?;
        let added = registry.add_if_absent(name);
        if added {
            registry.save(self.store).await?;
        }
        Ok(added)
    }

    /// Preview a draft on top of the current document.
    ///
    /// Read-only: on a fresh store the seed document and default
    /// categories are used without being written.
    pub async fn preview(&self, draft: &EntryDraft) -> Result<String> {
        let mut draft = draft.clone();
        draft.category = match explicit_category(&draft) {
            Some(name) => Some(name),
            None => {
                CategoryRegistry::peek(self.store, &self.options.default_categories)
                    .await?
                    .selected(self.store)
                    .await?
            }
        };
        let current = match self.stored_document().await? {
            Some(doc) => doc,
            None => seed_document(&self.options.title, &self.options.default_categories),
        };
        Ok(preview_document(&current, &draft, self.options.strategy))
    }
}

fn explicit_category(draft: &EntryDraft) -> Option<String> {
    draft
        .category
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
