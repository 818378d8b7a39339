//! # CLI Module
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! # Organize a tree into dated folders
//! photo-organize move --source ~/Incoming --target ~/Photos
//!
//! # Preview without touching anything
//! photo-organize move --source ~/Incoming --target ~/Photos --pretend
//!
//! # Remove copies that already exist in the archive
//! photo-organize clean --source ~/Incoming --target ~/Photos
//!
//! # Deduplicate within one tree, keeping the newest copy
//! photo-organize clean --source ~/Photos --keep newest
//!
//! # Inspect embedded metadata
//! photo-organize info IMG_1234.jpg
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::ProgressBar;
use photo_organizer::core::compare::CompareDepth;
use photo_organizer::core::dedup::{CleanEngine, CleanEvent, CleanSummary};
use photo_organizer::core::organize::{MoveDriver, MoveEvent, MoveSummary, PathMismatch};
use photo_organizer::core::{metadata, CleanOptions, KeepPolicy, MoveOptions};
use photo_organizer::error::{OrganizerError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Photo Organizer - dated folders and duplicate removal for photo trees
#[derive(Parser, Debug)]
#[command(name = "photo-organize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move files into a dated <target>/<year>/<month>/<day>/ layout
    Move {
        /// Root of the tree to organize
        #[arg(long, default_value = ".")]
        source: PathBuf,

        /// Root of the destination archive
        #[arg(long, default_value = ".")]
        target: PathBuf,

        /// Don't recurse into subfolders
        #[arg(long)]
        no_recurse: bool,

        /// Keep the source file when the destination already holds an
        /// identical copy
        #[arg(long)]
        keep_duplicates: bool,

        /// Compare by size and modification time only, skipping content
        /// comparison (faster but lossy)
        #[arg(long)]
        shallow: bool,

        /// Don't load or save the completion cache
        #[arg(long)]
        no_cache: bool,

        /// Refuse to relocate when the destination name is taken by
        /// different content
        #[arg(long)]
        no_overwrite: bool,

        /// Copy files into place instead of moving them
        #[arg(long)]
        copy: bool,

        /// Show what would be done without touching the filesystem
        #[arg(long)]
        pretend: bool,

        /// Also report files that need no action
        #[arg(short, long)]
        verbose: bool,
    },

    /// Remove duplicate copies within a tree or against an archive
    Clean {
        /// Root of the tree holding suspected duplicates
        #[arg(long, default_value = ".")]
        source: PathBuf,

        /// Archive root to check against; omit to deduplicate within the
        /// source tree
        #[arg(long)]
        target: Option<PathBuf>,

        /// Which members of a duplicate group to keep
        #[arg(long, value_enum, conflicts_with = "target")]
        keep: Option<KeepArg>,

        /// Break remaining ties by keeping the lexicographically first path
        #[arg(long, conflicts_with = "target")]
        force: bool,

        /// Trust size and hash equality without byte confirmation
        #[arg(long)]
        shallow: bool,

        /// Don't recurse into subfolders of the source
        #[arg(long)]
        no_recurse: bool,

        /// Show what would be done without touching the filesystem
        #[arg(long)]
        pretend: bool,

        /// Also report files that need no action
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the embedded metadata tags of the given files
    Info {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KeepArg {
    /// Keep the most recently modified file(s)
    Newest,
    /// Keep the earliest modified file(s)
    Oldest,
    /// Keep the file(s) with the shortest path
    Shortest,
    /// Keep the file(s) with the longest path
    Longest,
}

impl From<KeepArg> for KeepPolicy {
    fn from(arg: KeepArg) -> Self {
        match arg {
            KeepArg::Newest => KeepPolicy::Newest,
            KeepArg::Oldest => KeepPolicy::Oldest,
            KeepArg::Shortest => KeepPolicy::Shortest,
            KeepArg::Longest => KeepPolicy::Longest,
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Move {
            source,
            target,
            no_recurse,
            keep_duplicates,
            shallow,
            no_cache,
            no_overwrite,
            copy,
            pretend,
            verbose,
        } => run_move(MoveOptions {
            source: absolutize(&source)?,
            target: absolutize(&target)?,
            recurse: !no_recurse,
            remove_duplicates: !keep_duplicates,
            depth: depth_from_flag(shallow),
            use_cache: !no_cache,
            no_overwrite,
            copy,
            pretend,
            verbose,
        }),
        Commands::Clean {
            source,
            target,
            keep,
            force,
            shallow,
            no_recurse,
            pretend,
            verbose,
        } => run_clean(CleanOptions {
            source: absolutize(&source)?,
            target: target.as_deref().map(absolutize).transpose()?,
            recurse: !no_recurse,
            depth: depth_from_flag(shallow),
            keep: keep.map(KeepPolicy::from),
            force,
            pretend,
            verbose,
        }),
        Commands::Info { files } => run_info(&files),
    }
}

fn depth_from_flag(shallow: bool) -> CompareDepth {
    if shallow {
        CompareDepth::Shallow
    } else {
        CompareDepth::Deep
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        OrganizerError::Config(format!("cannot resolve path {}: {e}", path.display()))
    })
}

fn decision_bar(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn pretend_prefix(pretend: bool) -> String {
    if pretend {
        format!("{} ", style("[pretend]").dim())
    } else {
        String::new()
    }
}

fn run_move(options: MoveOptions) -> Result<()> {
    let bar = decision_bar("Organizing...");
    let prefix = pretend_prefix(options.pretend);
    let verbose = options.verbose;

    let mut driver = MoveDriver::new(&options);
    let summary = driver.run(|event| print_move_event(&bar, &prefix, verbose, event))?;
    bar.finish_and_clear();

    print_move_summary(&summary, &options);
    Ok(())
}

fn print_move_event(bar: &ProgressBar, prefix: &str, verbose: bool, event: MoveEvent) {
    match event {
        MoveEvent::ProperlyPlaced { path, resolved } => {
            if verbose {
                bar.println(format!(
                    "{prefix}{} {} (created {} via {}, already in place)",
                    style("placed").green().dim(),
                    path.display(),
                    resolved.datetime,
                    resolved.source,
                ));
            }
        }
        MoveEvent::Relocated {
            src,
            dst,
            resolved,
            mismatch,
        } => {
            bar.println(format!(
                "{prefix}{} {} -> {} (created {} via {}; {})",
                style("moved").green(),
                src.display(),
                dst.display(),
                resolved.datetime,
                resolved.source,
                describe_mismatch(mismatch),
            ));
        }
        MoveEvent::DuplicateAtDestination { src, dst, removed } => {
            let action = if removed {
                "removed source"
            } else {
                "kept both"
            };
            bar.println(format!(
                "{prefix}{} {} (same content already at {}; {action})",
                style("duplicate").yellow(),
                src.display(),
                dst.display(),
            ));
        }
        MoveEvent::Conflict { src, dst } => {
            bar.println(format!(
                "{prefix}{} {} ({} exists and is not a duplicate)",
                style("conflict").red(),
                src.display(),
                dst.display(),
            ));
        }
        MoveEvent::Undateable { path } => {
            if verbose {
                bar.println(format!(
                    "{prefix}{} {} (cannot infer a creation date)",
                    style("skipped").dim(),
                    path.display(),
                ));
            }
        }
        MoveEvent::Failed { src, error } => {
            bar.println(format!(
                "{prefix}{} {}: {error}",
                style("failed").red().bold(),
                src.display(),
            ));
        }
    }
}

fn describe_mismatch(mismatch: PathMismatch) -> String {
    match mismatch {
        PathMismatch::Year(year) => format!("was in year folder {year}"),
        PathMismatch::Month(month) => format!("was in month folder {month}"),
        PathMismatch::Day(day) => format!("was in day folder {day}"),
        PathMismatch::NoDateInPath => "no date in path".to_string(),
    }
}

fn print_move_summary(summary: &MoveSummary, options: &MoveOptions) {
    println!();
    println!("{} Move complete", style("✓").green().bold());
    println!(
        "  {} files examined, {} skipped via cache",
        style(summary.candidates).cyan(),
        style(summary.skipped_cached).cyan(),
    );
    println!(
        "  {} moved, {} already placed, {} duplicates at destination",
        style(summary.moved).cyan(),
        style(summary.properly_placed).cyan(),
        style(summary.duplicates).cyan(),
    );
    if summary.conflicts + summary.undateable + summary.failures > 0 {
        println!(
            "  {} conflicts, {} undateable, {} failures",
            style(summary.conflicts).yellow(),
            style(summary.undateable).yellow(),
            style(summary.failures).red(),
        );
    }
    if options.pretend {
        println!(
            "{}",
            style("Pretend mode: no files were touched.").dim()
        );
    }
}

fn run_clean(options: CleanOptions) -> Result<()> {
    let bar = decision_bar("Looking for duplicates...");
    let prefix = pretend_prefix(options.pretend);

    let engine = CleanEngine::new(&options);
    let verbose = options.verbose;
    let summary = engine.run(|event| print_clean_event(&bar, &prefix, verbose, event))?;
    bar.finish_and_clear();

    print_clean_summary(&summary, &options);
    Ok(())
}

fn print_clean_event(bar: &ProgressBar, prefix: &str, verbose: bool, event: CleanEvent) {
    match event {
        CleanEvent::DuplicateOfTarget { path, duplicate_of } => {
            bar.println(format!(
                "{prefix}{} {} (duplicate of {})",
                style("removed").yellow(),
                path.display(),
                duplicate_of.display(),
            ));
        }
        CleanEvent::GroupFound { members } => {
            bar.println(format!(
                "{prefix}{} {} identical copies:",
                style("group").bold(),
                members.len(),
            ));
            if verbose {
                for member in members {
                    bar.println(format!("  {} {}", style("○").dim(), member.display()));
                }
            }
        }
        CleanEvent::Deleted { paths, forced } => {
            let label = if forced { "removed (forced)" } else { "removed" };
            for path in paths {
                bar.println(format!(
                    "{prefix}{} {}",
                    style(label).yellow(),
                    path.display()
                ));
            }
        }
        CleanEvent::KeptAll { members } => {
            bar.println(format!(
                "{prefix}{} all {} copies (no unambiguous keeper)",
                style("kept").green(),
                members.len(),
            ));
        }
    }
}

fn print_clean_summary(summary: &CleanSummary, options: &CleanOptions) {
    println!();
    println!("{} Clean complete", style("✓").green().bold());
    println!(
        "  {} files examined, {} duplicate groups",
        style(summary.candidates).cyan(),
        style(summary.groups).cyan(),
    );
    println!(
        "  {} files removed, {} reclaimed",
        style(summary.deleted).cyan(),
        style(format_bytes(summary.bytes_reclaimed)).yellow(),
    );
    if options.pretend {
        println!(
            "{}",
            style("Pretend mode: no files were touched.").dim()
        );
    }
}

fn run_info(files: &[PathBuf]) -> Result<()> {
    for path in files {
        println!("{}", style(path.display()).bold());
        match metadata::tag_listing(path) {
            Some(tags) if !tags.is_empty() => {
                for (tag, value) in tags {
                    println!("  {tag:<24}: {value}");
                }
            }
            _ => println!("  {}", style("no embedded metadata").dim()),
        }
        println!();
    }
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
