use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use keylink_config::Config;
use keylink_engine::review::{accept_suggestions, reject_suggestions};
use keylink_engine::session::{ProcessingRegistry, TagQueue, TagRequest};
use keylink_engine::vault::FsVault;
use keylink_engine::{Document, RuleTable, ScanResult, io, resolve_rules, scan};
use relative_path::{RelativePath, RelativePathBuf};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long the tag queue waits for more requests before writing a batch.
const TAG_COALESCE_WINDOW: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "keylink")]
#[command(about = "Turn keyword mentions in markdown notes into links", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/keylink/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find keyword occurrences and show or write the links
    Scan {
        /// Write changes back to the notes instead of previewing them
        #[arg(long)]
        apply: bool,

        /// Only process this note (relative to the notes directory)
        #[arg(long)]
        file: Option<String>,

        /// Notes directory (overrides the config file)
        notes: Option<PathBuf>,
    },

    /// Resolve suggestion markers left by suggest mode
    Suggestions {
        #[command(subcommand)]
        action: SuggestionAction,
    },

    /// Print where the config file is read from
    ConfigPath,
}

#[derive(Subcommand)]
enum SuggestionAction {
    /// Turn every suggestion into a link
    Accept {
        #[arg(long)]
        file: Option<String>,
        notes: Option<PathBuf>,
    },
    /// Strip every suggestion back to plain text
    Reject {
        #[arg(long)]
        file: Option<String>,
        notes: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    match cli.command {
        Commands::ConfigPath => {
            println!("{}", config_path.display());
            Ok(())
        }
        Commands::Scan { apply, file, notes } => {
            let config = load_config(&config_path, notes)?;
            run_scan(&config, file.as_deref().map(RelativePath::new), apply)
        }
        Commands::Suggestions { action } => match action {
            SuggestionAction::Accept { file, notes } => {
                let config = load_config(&config_path, notes)?;
                resolve_suggestions(&config, file.as_deref().map(RelativePath::new), true)
            }
            SuggestionAction::Reject { file, notes } => {
                let config = load_config(&config_path, notes)?;
                resolve_suggestions(&config, file.as_deref().map(RelativePath::new), false)
            }
        },
    }
}

fn load_config(config_path: &Path, notes: Option<PathBuf>) -> Result<Config> {
    log::info!("Config path: {}", config_path.display());
    let loaded = Config::load_from_path(config_path)?;

    let config = match (loaded, notes) {
        (Some(mut config), Some(notes)) => {
            config.notes_path = notes;
            config
        }
        (Some(config), None) => config,
        (None, Some(notes)) => {
            log::warn!("No config file; scanning without keywords");
            Config::new(notes)
        }
        (None, None) => bail!(
            "No config file at {} and no notes directory given",
            config_path.display()
        ),
    };

    io::validate_notes_dir(&config.notes_path)
        .with_context(|| format!("Notes directory {}", config.notes_path.display()))?;
    Ok(config)
}

/// Notes to process: one requested file, or every note not excluded.
fn select_notes(config: &Config, file: Option<&RelativePath>) -> Result<Vec<RelativePathBuf>> {
    let all = io::scan_markdown_files(&config.notes_path)?;
    if let Some(file) = file {
        if !all.iter().any(|n| n.as_relative_path() == file) {
            bail!("{file} is not a markdown note under {}", config.notes_path.display());
        }
        return Ok(vec![file.to_relative_path_buf()]);
    }
    Ok(all.into_iter().filter(|n| !config.is_excluded(n)).collect())
}

fn run_scan(config: &Config, file: Option<&RelativePath>, apply: bool) -> Result<()> {
    let root = config.notes_path.as_path();
    let notes = select_notes(config, file)?;
    let vault = FsVault::with_notes(root, io::scan_markdown_files(root)?)?;
    let table = resolve_rules(&config.keywords, &config.groups, &vault);
    log::info!(
        "Scanning {} notes with {} keyword forms",
        notes.len(),
        table.len()
    );

    let registry = ProcessingRegistry::new();
    let (tags_tx, tags) = TagQueue::channel();
    let mut total_links = 0;
    let mut changed_notes = 0;

    for note in &notes {
        let Some(_token) = registry.try_acquire(note) else {
            continue;
        };
        let Some((document, result)) = scan_note(config, &table, &vault, note)? else {
            continue;
        };
        total_links += result.link_count;
        changed_notes += 1;

        if !apply {
            print_preview(&document, &table, &result);
        } else if write_result(root, &document, &result)?
            && let Some(request) = TagRequest::from_scan(note, &result)
        {
            tags_tx.send(request);
        }
    }
    drop(tags_tx);

    if apply {
        let written = tags.flush_into(&vault, TAG_COALESCE_WINDOW);
        log::info!("Wrote tags for {written} notes");
    }
    println!(
        "{total_links} links in {changed_notes} of {} notes{}",
        notes.len(),
        if apply { "" } else { " (preview, use --apply to write)" }
    );
    Ok(())
}

fn scan_note(
    config: &Config,
    table: &RuleTable,
    vault: &FsVault,
    note: &RelativePath,
) -> Result<Option<(Document, ScanResult)>> {
    let document = io::read_document(note, &config.notes_path)
        .with_context(|| format!("Reading {note}"))?;
    let result = scan(&document, table, &config.options, vault)
        .with_context(|| format!("Scanning {note}"))?;
    if result.is_unchanged() {
        return Ok(None);
    }
    Ok(Some((document, result)))
}

/// Writes the scan's text if the note on disk is still what was scanned.
fn write_result(root: &Path, scanned: &Document, result: &ScanResult) -> Result<bool> {
    let note = scanned.id();
    let live = io::read_file(note, root)?;
    match result.commit_against(&live, &scanned.text) {
        Some(text) => {
            io::write_file(note, root, text)?;
            log::info!("{note}: {} links", result.link_count);
            Ok(true)
        }
        None => {
            log::warn!("{note} changed during the scan, skipped");
            Ok(false)
        }
    }
}

fn print_preview(document: &Document, table: &RuleTable, result: &ScanResult) {
    for span in &result.accepted_spans {
        let line = document.text[..span.start].matches('\n').count() + 1;
        let target = &table.rule(span.rule).target;
        println!(
            "{}:{line}: {} -> {} ({target})",
            document.id, span.surface_text, span.replacement
        );
    }
}

fn resolve_suggestions(config: &Config, file: Option<&RelativePath>, accept: bool) -> Result<()> {
    let root = config.notes_path.as_path();
    let mut resolved = 0;

    for note in select_notes(config, file)? {
        let text = io::read_file(&note, root)?;
        let applied = if accept {
            accept_suggestions(&text, |_| true)
        } else {
            reject_suggestions(&text, |_| true)
        };
        if applied.deltas.is_empty() {
            continue;
        }
        io::write_file(&note, root, &applied.text)?;
        log::info!("{note}: {} suggestions resolved", applied.deltas.len());
        resolved += applied.deltas.len();
    }

    println!(
        "{} {resolved} suggestions",
        if accept { "Accepted" } else { "Rejected" }
    );
    Ok(())
}
