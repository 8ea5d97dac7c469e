//! Block document conversion CLI.
//!
//! Usage:
//!   blockdoc render blocks.json            # document JSON -> HTML
//!   blockdoc render --sanitize blocks.json
//!   blockdoc parse page.html               # HTML -> document JSON
//!   blockdoc validate blocks.json          # report per-block problems
//!
//! Pass `-` as the input path to read from stdin.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use blockdoc::{BlockDocument, BlockTypeRegistry, from_html, sanitize_blocks, to_html};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a block document (JSON) to HTML.
    Render {
        /// Path to the document JSON, or `-` for stdin.
        input: PathBuf,
        /// Clean text content with ammonia before rendering.
        #[arg(long)]
        sanitize: bool,
    },
    /// Parse an HTML file into a block document (JSON).
    Parse {
        /// Path to the HTML file, or `-` for stdin.
        input: PathBuf,
    },
    /// Validate the blocks of a document against the standard block types.
    Validate {
        /// Path to the document JSON, or `-` for stdin.
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Render { input, sanitize } => {
            let json = read_input(&input)?;
            let mut doc = BlockDocument::from_json(&json).context("failed to parse document")?;
            if sanitize {
                sanitize_blocks(&mut doc.blocks);
            }
            info!(blocks = doc.blocks.len(), "rendering document");
            println!("{}", to_html(&doc));
        }
        Command::Parse { input } => {
            let html = read_input(&input)?;
            let doc = from_html(&html);
            info!(blocks = doc.blocks.len(), "parsed document");
            println!("{}", doc.to_json().context("failed to serialize document")?);
        }
        Command::Validate { input } => {
            let json = read_input(&input)?;
            let doc = BlockDocument::from_json(&json).context("failed to parse document")?;
            let registry = BlockTypeRegistry::with_standard_types();
            let mut problems = 0usize;
            for (index, block) in doc.blocks.iter().enumerate() {
                for error in registry.validate_block(&block.block_type, &block.data) {
                    println!("block {index}: {error}");
                    problems += 1;
                }
            }
            if problems > 0 {
                anyhow::bail!("{problems} validation problem(s) found");
            }
            println!("ok: {} block(s) valid", doc.blocks.len());
        }
    }

    Ok(())
}

/// Read the full contents of a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
