//! CLI command implementations.
//!
//! Each `run_*` function opens the SQLite store, performs one operation
//! through [`KnowledgeBase`], prints the result to stdout, and closes the
//! pool. Notices and warnings go to stderr.

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};

use clipper_core::document::KnowledgeBase;
use clipper_core::outline::build_tree;
use clipper_core::sync::{self, PullOutcome, PullSource, PushOutcome};
use clipper_core::EntryDraft;

use crate::config::Config;
use crate::export::{export_document, ExportTarget};
use crate::github::GithubMirror;
use crate::render;
use crate::sqlite_store::SqliteKvStore;

pub async fn run_init(config: &Config) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let kb = KnowledgeBase::new(&store, config.kb_options());
    let wrote = kb.initialize().await?;
    store.close().await;

    if wrote {
        println!(
            "Knowledge base initialized at {}",
            config.storage.path.display()
        );
    } else {
        println!("Knowledge base already initialized.");
    }
    Ok(())
}

pub async fn run_show(config: &Config) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let document = KnowledgeBase::new(&store, config.kb_options())
        .document()
        .await?;
    store.close().await;

    println!("{}", document);
    Ok(())
}

pub async fn run_add(
    config: &Config,
    draft: &EntryDraft,
    push: bool,
    message: Option<String>,
) -> Result<()> {
    // Resolve the mirror first so a missing [github] section fails before
    // anything is committed.
    let target = if push {
        let gh = config.github()?;
        let mirror = GithubMirror::from_config(gh)?;
        let message = message.unwrap_or_else(|| gh.commit_message.clone());
        Some((mirror, message))
    } else {
        None
    };

    let store = SqliteKvStore::open(config).await?;
    let kb = KnowledgeBase::new(&store, config.kb_options());
    let outcome = match kb.add_entry(draft).await {
        Ok(outcome) => outcome,
        Err(e) => {
            store.close().await;
            return Err(e.into());
        }
    };

    println!("Added '{}' to {}", draft.title.trim(), outcome.category);
    if outcome.category_created {
        println!("New category: {}", outcome.category);
    }

    let pushed = match &target {
        Some((mirror, message)) => {
            Some(sync::push(&kb, mirror, message, config.cache.ttl(), Utc::now()).await)
        }
        None => None,
    };
    store.close().await;

    if let Some(result) = pushed {
        print_push(result?);
    }
    Ok(())
}

pub async fn run_preview(config: &Config, draft: &EntryDraft) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let preview = KnowledgeBase::new(&store, config.kb_options())
        .preview(draft)
        .await?;
    store.close().await;

    println!("{}", preview);
    Ok(())
}

pub async fn run_category_list(config: &Config) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let kb = KnowledgeBase::new(&store, config.kb_options());
    let registry = kb.categories().await?;
    let selected = registry.selected(&store).await?;
    store.close().await;

    for name in registry.names() {
        let marker = if selected.as_deref() == Some(name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {}", marker, name);
    }
    Ok(())
}

pub async fn run_category_add(config: &Config, name: &str) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let added = KnowledgeBase::new(&store, config.kb_options())
        .add_category(name)
        .await?;
    store.close().await;

    if added {
        println!("Added category: {}", name.trim());
    } else if name.trim().is_empty() {
        anyhow::bail!("category name must not be empty");
    } else {
        println!("Category already exists: {}", name.trim());
    }
    Ok(())
}

pub async fn run_category_use(config: &Config, name: &str) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let kb = KnowledgeBase::new(&store, config.kb_options());
    let selected = kb.categories().await?.select(&store, name).await?;
    store.close().await;

    match selected {
        Some(sel) if sel == name.trim() => println!("Selected category: {}", sel),
        Some(sel) => {
            eprintln!("Unknown category '{}', falling back to '{}'", name, sel);
            println!("Selected category: {}", sel);
        }
        None => anyhow::bail!("no categories registered"),
    }
    Ok(())
}

pub async fn run_outline(config: &Config, tree: bool, json: bool) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let document = KnowledgeBase::new(&store, config.kb_options())
        .document()
        .await?;
    store.close().await;

    let entries = render::outline(&document);
    if tree {
        let nodes = build_tree(&entries);
        if json {
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        } else {
            for node in &nodes {
                println!("{}  #{}", node.heading.text, node.heading.id);
                for child in &node.children {
                    println!("  {}  #{}", child.text, child.id);
                }
            }
        }
    } else if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
            println!("{}{}  #{}", indent, entry.text, entry.id);
        }
    }
    Ok(())
}

pub async fn run_render(config: &Config, output: Option<&Path>) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let document = KnowledgeBase::new(&store, config.kb_options())
        .document()
        .await?;
    store.close().await;

    let page = render::render_page(&config.document.title, &document);
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, page)?;
            eprintln!("Rendered HTML to {}", path.display());
        }
        None => print!("{}", page),
    }
    Ok(())
}

pub async fn run_export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let store = SqliteKvStore::open(config).await?;
    let document = KnowledgeBase::new(&store, config.kb_options())
        .document()
        .await?;
    store.close().await;

    let path = output.unwrap_or_else(|| config.export.filename.clone());
    if let ExportTarget::File(path) = export_document(&document, &path)? {
        eprintln!("Exported {} bytes to {}", document.len(), path.display());
    }
    Ok(())
}

pub async fn run_pull(config: &Config, force: bool) -> Result<()> {
    let gh = config.github()?;
    let mirror = GithubMirror::from_config(gh)?;
    let store = SqliteKvStore::open(config).await?;
    let kb = KnowledgeBase::new(&store, config.kb_options());
    let outcome = sync::pull(&kb, &mirror, config.cache.ttl(), force, Utc::now()).await?;
    store.close().await;

    match outcome {
        PullOutcome::Updated { document, source } => {
            let from = match source {
                PullSource::Cache => "cache",
                PullSource::Remote => "remote",
            };
            println!(
                "Pulled {}/{}:{} from {} ({} bytes)",
                gh.owner,
                gh.repo,
                gh.path,
                from,
                document.len()
            );
        }
        PullOutcome::LocalChanges { document } => {
            eprintln!("Local document has changes since the last sync; use --force to replace it");
            println!("Using local document ({} bytes)", document.len());
        }
        PullOutcome::Fallback { document, error } => {
            eprintln!("Warning: {}", error);
            println!("Using local document ({} bytes)", document.len());
        }
    }
    Ok(())
}

pub async fn run_push(config: &Config, message: Option<String>) -> Result<()> {
    let gh = config.github()?;
    let mirror = GithubMirror::from_config(gh)?;
    let message = message.unwrap_or_else(|| gh.commit_message.clone());
    let store = SqliteKvStore::open(config).await?;
    let kb = KnowledgeBase::new(&store, config.kb_options());
    let result = sync::push(&kb, &mirror, &message, config.cache.ttl(), Utc::now()).await;
    store.close().await;

    print_push(result?);
    Ok(())
}

fn print_push(outcome: PushOutcome) {
    match outcome {
        PushOutcome::Created { sha } => println!("Created remote file ({})", sha),
        PushOutcome::Updated { sha } => println!("Updated remote file ({})", sha),
        PushOutcome::Unchanged { sha } => println!("Remote already up to date ({})", sha),
    }
}

pub async fn run_verify(config: &Config) -> Result<()> {
    let gh = config.github()?;
    let mirror = GithubMirror::from_config(gh)?;
    let login = mirror.verify_token().await?;
    println!("Token OK: authenticated as {}", login);
    Ok(())
}
