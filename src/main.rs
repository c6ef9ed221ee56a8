//! Temparc CLI - extract workshop temporary archive files
//!
//! With no archive argument, scans a source directory for `TempArchive*`
//! files and extracts all of them without prompting. With a single archive
//! argument, asks for confirmation entry by entry, the way the original
//! drag-and-drop tool did.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use temparc_rs::{
    discover_archives, extract, is_affirmative, DecisionPrompt, Decoder, DirResolver,
    EntryDecision, ExtractPolicy, ARCHIVE_PREFIX,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "temparc",
    version,
    about = "Extract workshop temporary archive files",
    long_about = "Extract the contents of workshop-download temporary archives.\n\n\
                  Run without an archive argument to batch-extract every \
                  TempArchive* file in the source directory; pass a single \
                  archive to confirm each entry interactively."
)]
struct Cli {
    /// Archive to extract interactively; omit for batch mode
    archive: Option<PathBuf>,

    /// Directory scanned for TempArchive* files in batch mode
    #[arg(long, default_value = ".")]
    source_dir: PathBuf,

    /// Base directory for output; each archive gets its own subfolder
    #[arg(short, long, default_value = "extracted")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Console prompt mirroring the original tool's `[Y/N]` line
struct ConsolePrompt;

impl DecisionPrompt for ConsolePrompt {
    fn confirm(&mut self, name: &str, already_exists: bool, size: u64) -> EntryDecision {
        let verb = if already_exists { "Overwrite" } else { "Extract" };
        print!("{verb}  {name}  Size: 0x{size:X} ({size} bytes)  [Y/N] : ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) if is_affirmative(&line) => EntryDecision::Extract,
            _ => EntryDecision::Skip,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match &cli.archive {
        Some(archive) => {
            // Interactive mode on a single archive
            process_archive(archive, &cli.output, true)
                .with_context(|| format!("file {} incorrectly processed", archive.display()))
        }
        None => run_batch(&cli),
    }
}

/// Batch mode: every discovered archive, no prompting, failures reported
/// per archive without stopping the run.
fn run_batch(cli: &Cli) -> Result<()> {
    let archives = discover_archives(&cli.source_dir)
        .with_context(|| format!("cannot scan {}", cli.source_dir.display()))?;

    if archives.is_empty() {
        println!("No {ARCHIVE_PREFIX}* file to process in {}", cli.source_dir.display());
        return Ok(());
    }

    let mut failures = 0usize;
    for archive in &archives {
        if let Err(err) = process_archive(archive, &cli.output, false) {
            tracing::error!(archive = %archive.display(), error = %err, "archive failed");
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} of {} archive(s) incorrectly processed", archives.len());
    }
    Ok(())
}

/// Extract one archive into its own subfolder under `output`
fn process_archive(archive: &Path, output: &Path, interactive: bool) -> Result<()> {
    let archive_name = archive
        .file_name()
        .with_context(|| format!("{} has no file name", archive.display()))?;

    tracing::info!(archive = %archive.display(), "processing archive");

    let stream = File::open(archive).with_context(|| format!("cannot open {}", archive.display()))?;
    let mut decoder = Decoder::new(stream);
    let mut resolver = DirResolver::new(output.join(archive_name));

    let mut prompt = ConsolePrompt;
    let policy = if interactive {
        ExtractPolicy::Interactive(&mut prompt)
    } else {
        ExtractPolicy::Unconditional
    };

    let report = extract(&mut decoder, policy, &mut resolver)?;
    tracing::info!(
        archive = %archive.display(),
        extracted = report.extracted,
        skipped = report.skipped,
        total = report.total,
        "archive processed successfully"
    );
    Ok(())
}
