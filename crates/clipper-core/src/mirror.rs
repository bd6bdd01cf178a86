//! Remote mirror abstraction.
//!
//! A mirror is a single remote file (a repository README) that holds a
//! copy of the document. The native binary implements it over the GitHub
//! contents API.

use async_trait::async_trait;

use crate::error::RemoteFailure;

/// Decoded remote file plus the content hash needed to update it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: String,
    pub sha: String,
}

#[async_trait]
pub trait Mirror: Send + Sync {
    /// Repository owner, used for the cache key.
    fn owner(&self) -> &str;

    /// Repository name, used for the cache key.
    fn repo(&self) -> &str;

    /// Read the remote file.
    async fn fetch(&self) -> Result<RemoteFile, RemoteFailure>;

    /// Create or update the remote file. `sha` must be the current remote
    /// hash when updating and `None` when creating. Returns the new hash.
    async fn put(
        &self,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<String, RemoteFailure>;
}
