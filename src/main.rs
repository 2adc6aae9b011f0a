//! Postmark - Render a markdown post to the terminal, with highlights.
//!
//! # Usage
//!
//! ```bash
//! postmark post.md
//! postmark --highlights marks.json --post-id post-7 post.md
//! postmark --format json post.md
//! ```

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use postmark::config::{
    ConfigFlags, OutputFormat, ThemeMode, clear_config_flags, global_config_path,
    load_config_flags, local_override_path, parse_flag_tokens, save_config_flags,
};
use postmark::document::{Document, RenderBlock};
use postmark::highlight::{HighlightRange, highlights_for_post, parse_highlights};
use postmark::ui::style::{Theme, supports_truecolor};
use postmark::ui::{RenderOptions, write_blocks};

/// Render a markdown post with persisted highlights
#[derive(Parser, Debug)]
#[command(name = "postmark", version, about, long_about = None)]
struct Cli {
    /// Markdown file to render
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Color theme for the terminal background (auto reads COLORFGBG)
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Disable ANSI styling
    #[arg(long)]
    no_color: bool,

    /// JSON file of highlight ranges
    #[arg(long, value_name = "PATH")]
    highlights: Option<PathBuf>,

    /// Only apply highlights recorded for this post
    #[arg(long, value_name = "ID")]
    post_id: Option<String>,

    /// Block receiving highlights (defaults to the first text block)
    #[arg(long, value_name = "N")]
    block: Option<usize>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn load_highlights(flags: &ConfigFlags) -> Result<Vec<HighlightRange>> {
    let Some(path) = &flags.highlights else {
        return Ok(Vec::new());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read highlights {}", path.display()))?;
    let ranges = parse_highlights(&json)
        .with_context(|| format!("Invalid highlights file {}", path.display()))?;
    tracing::debug!(count = ranges.len(), path = %path.display(), "loaded highlights");
    Ok(match &flags.post_id {
        Some(post_id) => highlights_for_post(post_id, &ranges),
        None => ranges,
    })
}

/// The document's blocks, with highlights painted on the chosen block.
fn blocks_to_print(
    doc: &Document,
    block: Option<usize>,
    ranges: &[HighlightRange],
) -> Result<Vec<RenderBlock>> {
    if ranges.is_empty() {
        return Ok(doc.blocks().to_vec());
    }
    let Some(index) = block.or_else(|| doc.first_text_block()) else {
        tracing::warn!("document has no text block, highlights not applied");
        return Ok(doc.blocks().to_vec());
    };
    match doc.block(index) {
        None => anyhow::bail!(
            "Block {index} out of range (document has {} blocks)",
            doc.block_count()
        ),
        Some(target) if target.styled_text().is_none() => {
            anyhow::bail!("Block {index} is an image or divider and cannot be highlighted")
        }
        Some(_) => Ok(doc.blocks_with_highlights(index, ranges)),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let source = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let doc = Document::parse(&source);
    let ranges = load_highlights(&effective)?;

    let blocks = blocks_to_print(&doc, cli.block, &ranges)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match effective.format.unwrap_or(OutputFormat::Ansi) {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &blocks).context("Failed to write JSON")?;
            writeln!(out)?;
        }
        format => {
            let colorfgbg = std::env::var("COLORFGBG").ok();
            let mode = effective
                .theme
                .unwrap_or(ThemeMode::Auto)
                .resolve(colorfgbg.as_deref());
            let options = RenderOptions {
                color: format == OutputFormat::Ansi
                    && !effective.no_color
                    && io::stdout().is_terminal(),
                truecolor: supports_truecolor(),
                theme: Theme::for_background(mode),
            };
            write_blocks(&mut out, &blocks, &options).context("Failed to write output")?;
        }
    }
    out.flush()?;
    Ok(())
}
