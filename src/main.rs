//! # Clipper CLI (`clip`)
//!
//! ## Usage
//!
//! ```bash
//! clip --config ./config/clipper.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `clip init` | Create the database and seed the document and categories |
//! | `clip show` | Print the current document |
//! | `clip add ...` | Add an entry under its category |
//! | `clip preview ...` | Show the document with a draft entry, without saving |
//! | `clip category list\|add\|use` | Manage categories |
//! | `clip outline` | Print the heading outline |
//! | `clip render` | Render HTML with heading anchors |
//! | `clip export` | Write the document to a Markdown file |
//! | `clip pull` | Refresh the document from the GitHub mirror |
//! | `clip push` | Push the document to the GitHub mirror |
//! | `clip verify` | Check the GitHub token |
//! | `clip completions <shell>` | Print shell completions |

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use clipper::commands;
use clipper::config::{self, Config};
use clipper_core::EntryDraft;

const DEFAULT_CONFIG: &str = "./config/clipper.toml";

/// Clipper: curate a Markdown knowledge base of categorized resources.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the flag is omitted and `./config/clipper.toml` does not
/// exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "clip",
    about = "Clipper: curate a Markdown knowledge base of categorized resources",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults to `./config/clipper.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr. `RUST_LOG` takes precedence.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Fields of a resource entry. Either `--url` or `--domain` supplies the
/// website; `--protocol` defaults to `https://`.
#[derive(Args, Debug, Default)]
struct EntryArgs {
    /// Entry title (level-3 heading).
    #[arg(long, default_value = "")]
    title: String,

    /// One-line summary.
    #[arg(long, default_value = "")]
    summary: String,

    /// Full website URL. Overrides `--protocol`/`--domain`.
    #[arg(long)]
    url: Option<String>,

    /// URL scheme prefix used with `--domain`, e.g. `https://`.
    #[arg(long)]
    protocol: Option<String>,

    /// Website domain and path, e.g. `ripgrep.dev`.
    #[arg(long)]
    domain: Option<String>,

    /// GitHub URL. Falls back to the website URL.
    #[arg(long)]
    github: Option<String>,

    /// Category. Defaults to the selected category.
    #[arg(long)]
    category: Option<String>,
}

impl From<EntryArgs> for EntryDraft {
    fn from(args: EntryArgs) -> Self {
        EntryDraft {
            title: args.title,
            summary: args.summary,
            protocol: args.protocol,
            domain: args.domain,
            website_url: args.url,
            github_url: args.github,
            category: args.category,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and seed the document.
    ///
    /// Idempotent: an existing document and category list are left alone.
    Init,

    /// Print the current document.
    Show,

    /// Add a resource entry to the document.
    ///
    /// The entry is appended to the end of its category section. A missing
    /// section is created at the end of the document.
    Add {
        #[command(flatten)]
        entry: EntryArgs,

        /// Push the updated document to the GitHub mirror afterwards.
        #[arg(long)]
        push: bool,

        /// Commit message for `--push`.
        #[arg(long)]
        message: Option<String>,
    },

    /// Print the document with a draft entry overlaid, without saving.
    ///
    /// Missing fields are shown as placeholders.
    Preview {
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Manage categories.
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Print the heading outline with anchor ids.
    Outline {
        /// Group level-3+ headings under their level-2 section.
        #[arg(long)]
        tree: bool,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Render the document to HTML with a table of contents.
    Render {
        /// Output file. Prints to stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Export the document as Markdown.
    Export {
        /// Output file (`-` for stdout). Defaults to `export.filename`.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the local document with the GitHub mirror's copy.
    ///
    /// Served from cache while fresh. If the remote cannot be read the
    /// local document is kept.
    Pull {
        /// Bypass the cache.
        #[arg(long)]
        force: bool,
    },

    /// Push the local document to the GitHub mirror.
    Push {
        /// Commit message. Defaults to `github.commit_message`.
        #[arg(long)]
        message: Option<String>,
    },

    /// Verify the GitHub token.
    Verify,

    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories; the selected one is marked with `*`.
    List,
    /// Add a category if it does not exist.
    Add { name: String },
    /// Select the default category for `add` and `preview`.
    Use { name: String },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("clipper={0},clipper_core={0}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => config::load_config(path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if default.exists() {
                config::load_config(&default)
            } else {
                debug!("no config file at {}, using defaults", DEFAULT_CONFIG);
                Ok(Config::minimal())
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Completions need no config; everything else loads it on demand.
    let cfg = || resolve_config(cli.config.as_ref());

    match cli.command {
        Commands::Init => commands::run_init(&cfg()?).await?,
        Commands::Show => commands::run_show(&cfg()?).await?,
        Commands::Add {
            entry,
            push,
            message,
        } => {
            commands::run_add(&cfg()?, &EntryDraft::from(entry), push, message).await?;
        }
        Commands::Preview { entry } => {
            commands::run_preview(&cfg()?, &EntryDraft::from(entry)).await?;
        }
        Commands::Category { action } => {
            let cfg = cfg()?;
            match action {
                CategoryAction::List => commands::run_category_list(&cfg).await?,
                CategoryAction::Add { name } => commands::run_category_add(&cfg, &name).await?,
                CategoryAction::Use { name } => commands::run_category_use(&cfg, &name).await?,
            }
        }
        Commands::Outline { tree, json } => commands::run_outline(&cfg()?, tree, json).await?,
        Commands::Render { output } => commands::run_render(&cfg()?, output.as_deref()).await?,
        Commands::Export { output } => commands::run_export(&cfg()?, output).await?,
        Commands::Pull { force } => commands::run_pull(&cfg()?, force).await?,
        Commands::Push { message } => commands::run_push(&cfg()?, message).await?,
        Commands::Verify => commands::run_verify(&cfg()?).await?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "clip", &mut std::io::stdout());
        }
    }

    Ok(())
}
