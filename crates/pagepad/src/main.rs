mod render;
mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pagepad_config::EditorConfig;
use pagepad_core::{Document, Editor, Viewport};

/// Headless driver for the pagepad buffer engine: opens a file, replays
/// editing commands and prints the resulting viewport.
#[derive(Parser, Debug)]
#[command(name = "pagepad", version, about)]
struct Cli {
    /// File to open. An empty document is used when omitted.
    file: Option<PathBuf>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lines per compressed chunk when paging.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Number of visible rows.
    #[arg(long)]
    viewport_size: Option<usize>,

    /// 1-based line shown at the top of the viewport.
    #[arg(long)]
    start: Option<usize>,

    /// Page the document regardless of its size.
    #[arg(long)]
    paged: bool,

    /// Command to replay, e.g. `shift+right`, `type:abc`, `click:2,5`.
    /// May be repeated.
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,
}

fn load_config(cli: &Cli) -> EditorConfig {
    let path = cli.config.clone().unwrap_or_else(EditorConfig::config_path);
    let mut config = EditorConfig::load_or_create(&path);
    if let Some(size) = cli.chunk_size {
        config.chunk_size = size;
    }
    if let Some(size) = cli.viewport_size {
        config.viewport_size = size;
    }
    config.sanitize();
    config
}

async fn open_editor(cli: &Cli, config: &EditorConfig) -> Result<Editor> {
    let document = match &cli.file {
        Some(path) => Document::open_paged(
            path,
            config.chunk_size,
            config.paging_threshold_lines,
            cli.paged,
        )
        .await
        .with_context(|| format!("failed to open {}", path.display()))?,
        None => Document::new(),
    };

    let viewport =
        Viewport::new(config.viewport_size)?.with_placeholder(config.placeholder.as_str());
    let mut editor = Editor::new(document, viewport)?;
    if cli.file.is_none() {
        editor.set_indentation(config.indentation);
    }
    if cli.paged && !editor.document().is_paged() {
        editor.activate_chunk_mode(config.chunk_size).await?;
    }
    if let Some(start) = cli.start {
        editor.set_viewport(start.saturating_sub(1), config.viewport_size)?;
    }
    Ok(editor)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = load_config(&cli);
    let mut editor = open_editor(&cli, &config).await?;
    tracing::info!(
        "Opened {} ({} lines{})",
        editor.document().title,
        editor.document().line_count(),
        if editor.document().is_paged() { ", paged" } else { "" }
    );

    for input in &cli.commands {
        let command = script::parse_command(input)?;
        editor.settle().await;
        editor.execute(command);
    }
    editor.settle().await;

    println!("{}", render::render(&editor));
    Ok(())
}
