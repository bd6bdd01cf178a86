//! Pull and push against a [`Mirror`].
//!
//! # Pull
//!
//! 1. Unless forced, consult the [`RemoteCache`]. A hit is used as-is,
//!    unless the local document was edited after the entry was written;
//!    then the local copy is kept ([`PullOutcome::LocalChanges`]).
//! 2. On a miss or an expired entry, fetch the remote file, refresh the
//!    cache, and replace the local document.
//! 3. If the fetch fails, keep the local document and report the failure
//!    as [`PullOutcome::Fallback`] instead of an error.
//!
//! Categories found as `## ` sections in the pulled document are added
//! to the registry.
//!
//! # Push
//!
//! Reads the current remote hash (a 404 means the file will be created),
//! writes the local document with a trailing newline, and refreshes the
//! cache. Remote content that normalizes to the local document is left
//! alone. Failures come back
//! as [`ClipperError::RemoteWrite`]; the local document is untouched.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cache::{CacheLookup, RemoteCache};
use crate::document::KnowledgeBase;
use crate::error::{ClipperError, RemoteFailure, Result};
use crate::locate::section_names;
use crate::merge::normalize_document;
use crate::mirror::Mirror;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullSource {
    Cache,
    Remote,
}

#[derive(Debug)]
pub enum PullOutcome {
    Updated {
        document: String,
        source: PullSource,
    },
    /// The cached remote copy is fresh but the local document has changed
    /// since it was written. Nothing was replaced.
    LocalChanges { document: String },
    /// The remote could not be read; `document` is the local copy.
    Fallback {
        document: String,
        error: ClipperError,
    },
}

impl PullOutcome {
    pub fn document(&self) -> &str {
        match self {
            PullOutcome::Updated { document, .. }
            | PullOutcome::LocalChanges { document }
            | PullOutcome::Fallback { document, .. } => document,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Created { sha: String },
    Updated { sha: String },
    /// Remote content already matches the local document.
    Unchanged { sha: String },
}

pub async fn pull(
    kb: &KnowledgeBase<'_>,
    mirror: &dyn Mirror,
    ttl: Duration,
    force: bool,
    now: DateTime<Utc>,
) -> Result<PullOutcome> {
    let cache = RemoteCache::new(kb.store(), mirror.owner(), mirror.repo(), ttl);

    if !force {
        match cache.lookup(now).await? {
            CacheLookup::Hit(content) => {
                if let Some(local) = kb.stored_document().await? {
                    if local != normalize_document(&content) {
                        info!(
                            owner = mirror.owner(),
                            repo = mirror.repo(),
                            "local document changed since last sync, keeping it"
                        );
                        return Ok(PullOutcome::LocalChanges { document: local });
                    }
                }
                let document = adopt(kb, &content).await?;
                return Ok(PullOutcome::Updated {
                    document,
                    source: PullSource::Cache,
                });
            }
            CacheLookup::Miss | CacheLookup::Expired => {}
        }
    }

    match mirror.fetch().await {
        Ok(file) => {
            cache.write(&file.content, now).await?;
            let document = adopt(kb, &file.content).await?;
            info!(owner = mirror.owner(), repo = mirror.repo(), "pulled remote document");
            Ok(PullOutcome::Updated {
                document,
                source: PullSource::Remote,
            })
        }
        Err(failure) => {
            warn!(
                owner = mirror.owner(),
                repo = mirror.repo(),
                "remote fetch failed, keeping local document: {}",
                failure
            );
            let document = kb.document().await?;
            Ok(PullOutcome::Fallback {
                document,
                error: ClipperError::RemoteFetch(failure),
            })
        }
    }
}

/// Save `content` as the local document and register its sections.
async fn adopt(kb: &KnowledgeBase<'_>, content: &str) -> Result<String> {
    let document = kb.save_document(content).await?;
    let mut registry = kb.categories().await?;
    let mut changed = false;
    for name in section_names(&document) {
        changed |= registry.add_if_absent(&name);
    }
    if changed {
        registry.save(kb.store()).await?;
    }
    Ok(document)
}

pub async fn push(
    kb: &KnowledgeBase<'_>,
    mirror: &dyn Mirror,
    message: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<PushOutcome> {
    let document = kb.document().await?;

    let prior = match mirror.fetch().await {
        Ok(file) => Some(file),
        Err(RemoteFailure::NotFound) => None,
        Err(failure) => return Err(ClipperError::RemoteWrite(failure)),
    };

    if let Some(file) = &prior {
        if normalize_document(&file.content) == document {
            return Ok(PushOutcome::Unchanged {
                sha: file.sha.clone(),
            });
        }
    }

    let prior_sha = prior.as_ref().map(|f| f.sha.as_str());
    let sha = mirror
        .put(&format!("{}\n", document), prior_sha, message)
        .await
        .map_err(ClipperError::RemoteWrite)?;

    RemoteCache::new(kb.store(), mirror.owner(), mirror.repo(), ttl)
        .write(&document, now)
        .await?;

    info!(owner = mirror.owner(), repo = mirror.repo(), %sha, "pushed document");
    Ok(match prior {
        Some(_) => PushOutcome::Updated { sha },
        None => PushOutcome::Created { sha },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::document::KnowledgeBaseOptions;
    use crate::mirror::RemoteFile;
    use crate::models::EntryDraft;
    use crate::store::memory::InMemoryKvStore;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeMirror {
        file: Mutex<Option<RemoteFile>>,
        fetch_error: Option<RemoteFailure>,
        put_error: Option<RemoteFailure>,
        fetches: AtomicUsize,
        puts: Mutex<Vec<Option<String>>>,
    }

    impl FakeMirror {
        fn with_content(content: &str) -> Self {
            Self {
                file: Mutex::new(Some(RemoteFile {
                    content: content.to_string(),
                    sha: "sha-1".to_string(),
                })),
                fetch_error: None,
                put_error: None,
                fetches: AtomicUsize::new(0),
                puts: Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            let mirror = Self::with_content("");
            *mirror.file.lock().unwrap() = None;
            mirror
        }

        fn failing(failure: RemoteFailure) -> Self {
            let mut mirror = Self::with_content("");
            mirror.fetch_error = Some(failure);
            mirror
        }
    }

    #[async_trait]
    impl Mirror for FakeMirror {
        fn owner(&self) -> &str {
            "octo"
        }

        fn repo(&self) -> &str {
            "kb"
        }

        async fn fetch(&self) -> Result<RemoteFile, RemoteFailure> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.fetch_error {
                return Err(err.clone());
            }
            self.file.lock().unwrap().clone().ok_or(RemoteFailure::NotFound)
        }

        async fn put(
            &self,
            content: &str,
            sha: Option<&str>,
            _message: &str,
        ) -> Result<String, RemoteFailure> {
            if let Some(err) = &self.put_error {
                return Err(err.clone());
            }
            self.puts.lock().unwrap().push(sha.map(str::to_string));
            let new_sha = format!("sha-{}", self.puts.lock().unwrap().len() + 1);
            *self.file.lock().unwrap() = Some(RemoteFile {
                content: content.to_string(),
                sha: new_sha.clone(),
            });
            Ok(new_sha)
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn options() -> KnowledgeBaseOptions {
        KnowledgeBaseOptions {
            title: "Local".into(),
            default_categories: vec!["Tools".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_pull_fetches_then_serves_from_cache() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        let mirror = FakeMirror::with_content("# Remote\n\n## Papers");

        let first = pull(&kb, &mirror, DEFAULT_TTL, false, t(0)).await.unwrap();
        assert!(matches!(
            first,
            PullOutcome::Updated {
                source: PullSource::Remote,
                ..
            }
        ));
        assert_eq!(kb.document().await.unwrap(), "# Remote\n\n## Papers");
        assert!(kb.categories().await.unwrap().contains("Papers"));

        let second = pull(&kb, &mirror, DEFAULT_TTL, false, t(60)).await.unwrap();
        assert!(matches!(
            second,
            PullOutcome::Updated {
                source: PullSource::Cache,
                ..
            }
        ));
        assert_eq!(mirror.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pull_refetches_when_expired_or_forced() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        let mirror = FakeMirror::with_content("# Remote");

        pull(&kb, &mirror, DEFAULT_TTL, false, t(0)).await.unwrap();
        pull(&kb, &mirror, DEFAULT_TTL, false, t(601)).await.unwrap();
        assert_eq!(mirror.fetches.load(Ordering::SeqCst), 2);

        pull(&kb, &mirror, DEFAULT_TTL, true, t(602)).await.unwrap();
        assert_eq!(mirror.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_pull_falls_back_to_local() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        kb.initialize().await.unwrap();
        let local = kb.document().await.unwrap();
        let mirror = FakeMirror::failing(RemoteFailure::RateLimited);

        let outcome = pull(&kb, &mirror, DEFAULT_TTL, false, t(0)).await.unwrap();
        match outcome {
            PullOutcome::Fallback { document, error } => {
                assert_eq!(document, local);
                assert!(matches!(
                    error,
                    ClipperError::RemoteFetch(RemoteFailure::RateLimited)
                ));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
        assert_eq!(kb.document().await.unwrap(), local);
    }

    #[tokio::test]
    async fn test_push_updates_with_prior_sha_and_refreshes_cache() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        kb.initialize().await.unwrap();
        let mirror = FakeMirror::with_content("# Old");

        let outcome = push(&kb, &mirror, "update", DEFAULT_TTL, t(0)).await.unwrap();
        assert!(matches!(outcome, PushOutcome::Updated { .. }));
        assert_eq!(
            mirror.puts.lock().unwrap().as_slice(),
            &[Some("sha-1".to_string())]
        );

        let cache = RemoteCache::new(&store, "octo", "kb", DEFAULT_TTL);
        assert_eq!(
            cache.lookup(t(1)).await.unwrap(),
            CacheLookup::Hit(kb.document().await.unwrap())
        );
    }

    #[tokio::test]
    async fn test_push_creates_missing_file() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        let mirror = FakeMirror::empty();

        let outcome = push(&kb, &mirror, "create", DEFAULT_TTL, t(0)).await.unwrap();
        assert!(matches!(outcome, PushOutcome::Created { .. }));
        assert_eq!(mirror.puts.lock().unwrap().as_slice(), &[None]);
    }

    #[tokio::test]
    async fn test_push_unchanged_skips_write() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        let doc = kb.document().await.unwrap();
        let mirror = FakeMirror::with_content(&doc);

        let outcome = push(&kb, &mirror, "noop", DEFAULT_TTL, t(0)).await.unwrap();
        assert_eq!(
            outcome,
            PushOutcome::Unchanged {
                sha: "sha-1".into()
            }
        );
        assert!(mirror.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_failure_is_write_error() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        kb.initialize().await.unwrap();
        let before = kb.document().await.unwrap();

        let mut mirror = FakeMirror::with_content("# Old");
        mirror.put_error = Some(RemoteFailure::Forbidden("read-only token".into()));
        let err = push(&kb, &mirror, "update", DEFAULT_TTL, t(0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClipperError::RemoteWrite(RemoteFailure::Forbidden(_))
        ));
        assert_eq!(kb.document().await.unwrap(), before);

        let auth = FakeMirror::failing(RemoteFailure::Unauthorized);
        let err = push(&kb, &auth, "update", DEFAULT_TTL, t(0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClipperError::RemoteWrite(RemoteFailure::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_pull_then_push_is_unchanged() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        let mirror = FakeMirror::with_content("# Remote\n\n## Papers\n");

        pull(&kb, &mirror, DEFAULT_TTL, true, t(0)).await.unwrap();
        let outcome = push(&kb, &mirror, "noop", DEFAULT_TTL, t(1)).await.unwrap();
        assert_eq!(
            outcome,
            PushOutcome::Unchanged {
                sha: "sha-1".into()
            }
        );
        assert!(mirror.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_writes_trailing_newline() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        kb.initialize().await.unwrap();
        let mirror = FakeMirror::with_content("# Old\n");

        push(&kb, &mirror, "update", DEFAULT_TTL, t(0)).await.unwrap();
        let remote = mirror.file.lock().unwrap().clone().unwrap();
        assert_eq!(remote.content, "# Local\n\n## Tools\n");

        let again = push(&kb, &mirror, "noop", DEFAULT_TTL, t(1)).await.unwrap();
        assert!(matches!(again, PushOutcome::Unchanged { .. }));
    }

    #[tokio::test]
    async fn test_cached_pull_keeps_local_edits() {
        let store = InMemoryKvStore::new();
        let kb = KnowledgeBase::new(&store, options());
        let mirror = FakeMirror::with_content("# Remote\n\n## Papers\n");
        pull(&kb, &mirror, DEFAULT_TTL, false, t(0)).await.unwrap();

        let draft = EntryDraft {
            title: "Mine".into(),
            summary: "s".into(),
            domain: Some("mine.dev".into()),
            category: Some("Papers".into()),
            ..Default::default()
        };
        kb.add_entry(&draft).await.unwrap();

        let outcome = pull(&kb, &mirror, DEFAULT_TTL, false, t(60)).await.unwrap();
        assert!(matches!(outcome, PullOutcome::LocalChanges { .. }));
        assert!(outcome.document().contains("### Mine"));
        assert!(kb.document().await.unwrap().contains("### Mine"));
        assert_eq!(mirror.fetches.load(Ordering::SeqCst), 1);

        let forced = pull(&kb, &mirror, DEFAULT_TTL, true, t(61)).await.unwrap();
        assert!(matches!(
            forced,
            PullOutcome::Updated {
                source: PullSource::Remote,
                ..
            }
        ));
        assert_eq!(kb.document().await.unwrap(), "# Remote\n\n## Papers");
    }
}
