//! Category registry.
//!
//! An ordered list of unique category names. Order is insertion order:
//! new categories go last and nothing is ever sorted. Each name maps to
//! a `## <name>` section of the document.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::store::{KvStore, CATEGORIES_KEY, SELECTED_CATEGORY_KEY};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRegistry {
    names: Vec<String>,
}

impl CategoryRegistry {
    /// Build a registry from names, dropping blanks and duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        for name in names {
            registry.add_if_absent(name.as_ref());
        }
        registry
    }

    /// Append `name` unless it is already present or blank.
    ///
    /// Returns `true` if the registry changed.
    pub fn add_if_absent(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name.trim())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Keep `current` if it is still registered, otherwise fall back to
    /// the first category.
    pub fn resolve_selection(&self, current: Option<&str>) -> Option<String> {
        match current {
            Some(name) if self.contains(name) => Some(name.trim().to_string()),
            _ => self.names.first().cloned(),
        }
    }

    /// Load the registry, seeding it with `defaults` on first run.
    ///
    /// A stored value that is not a JSON string array is discarded and
    /// reseeded.
    pub async fn load(store: &dyn KvStore, defaults: &[String]) -> Result<Self> {
        if let Some(raw) = store.get(CATEGORIES_KEY).await? {
            match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(names) => return Ok(Self::from_names(names)),
                Err(e) => {
                    warn!("stored category list is corrupt ({}); reseeding", e);
                    store.remove(CATEGORIES_KEY).await?;
                }
            }
        }
        let registry = Self::from_names(defaults);
        registry.save(store).await?;
        Ok(registry)
    }

    /// Read the registry without writing anything. A missing or corrupt
    /// value yields `defaults`.
    pub async fn peek(store: &dyn KvStore, defaults: &[String]) -> Result<Self> {
        let stored = store
            .get(CATEGORIES_KEY)
            .await?
            .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok());
        Ok(match stored {
            Some(names) => Self::from_names(names),
            None => Self::from_names(defaults),
        })
    }

    pub async fn save(&self, store: &dyn KvStore) -> Result<()> {
        let json = serde_json::to_string(&self.names).map_err(anyhow::Error::from)?;
        store.set(CATEGORIES_KEY, &json).await?;
        Ok(())
    }

    /// The selected category after applying the fallback rule.
    pub async fn selected(&self, store: &dyn KvStore) -> Result<Option<String>> {
        let stored = store.get(SELECTED_CATEGORY_KEY).await?;
        Ok(self.resolve_selection(stored.as_deref()))
    }

    /// Persist a selection, falling back to the first category when
    /// `name` is not registered. Returns what was actually selected.
    pub async fn select(&self, store: &dyn KvStore, name: &str) -> Result<Option<String>> {
        let resolved = self.resolve_selection(Some(name));
        match &resolved {
            Some(sel) => store.set(SELECTED_CATEGORY_KEY, sel).await?,
            None => store.remove(SELECTED_CATEGORY_KEY).await?,
        }
        Ok(resolved)
    }
}
