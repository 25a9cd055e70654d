//! # CLI Module
//!
//! Terminal shell over the browser core.
//!
//! ## Usage
//! ```bash
//! # Scan a directory and list duplicate rows
//! dupe-browse list ~/Downloads
//!
//! # With thumbnails, as JSON
//! dupe-browse list ~/Downloads --thumbnails --output json
//!
//! # Preview one file the way the preview region would
//! dupe-browse preview ~/Downloads/notes.txt
//!
//! # Move rows 1 and 3 to the trash
//! dupe-browse delete ~/Downloads --rows 1,3 --yes
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use dupe_browser::core::coordinator::{SelectionCoordinator, StatusUpdate};
use dupe_browser::core::detector::DetectorConfig;
use dupe_browser::core::fileops::{FileOperations, SystemFileOperations};
use dupe_browser::core::model::{flatten_groups, DuplicateGroup, Entry, FoundFile};
use dupe_browser::core::preview::{Preview, PreviewDispatcher};
use dupe_browser::core::thumbnail::{SlotId, SlotImage};
use dupe_browser::error::{BrowserError, Result, ScanError};
use dupe_browser::events::{Event, EventChannel, EventReceiver, ScanEvent};
use dupe_browser::BrowserConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Duplicate Browser - look through duplicates before removing them
#[derive(Parser, Debug)]
#[command(name = "dupe-browse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory and list duplicate groups as rows
    List {
        directory: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,

        /// Generate a thumbnail for every row
        #[arg(long)]
        thumbnails: bool,

        /// Downscale thumbnails to this edge length
        #[arg(long)]
        max_edge: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Preview a single file
    Preview {
        file: PathBuf,

        /// Lines of text to print for text previews
        #[arg(long, default_value = "20")]
        lines: usize,

        /// Open the file externally if no preview is available
        #[arg(long)]
        open: bool,
    },

    /// Move rows of a scanned directory to the trash
    Delete {
        directory: PathBuf,

        /// Row numbers as printed by `list`
        #[arg(long, required = true, value_delimiter = ',')]
        rows: Vec<usize>,

        #[command(flatten)]
        scan: ScanArgs,

        /// Actually move files; without this only the targets are shown
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ScanArgs {
    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Give up on the scan after this many seconds
    #[arg(long, default_value = "600")]
    timeout: u64,

    /// ffmpeg binary used for video thumbnails
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,
}

impl ScanArgs {
    fn config(&self, max_edge: Option<u32>) -> BrowserConfig {
        BrowserConfig {
            thumbnail_max_edge: max_edge,
            ffmpeg_program: self.ffmpeg.clone(),
            detector: DetectorConfig {
                include_hidden: self.include_hidden,
                follow_symlinks: self.follow_symlinks,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            directory,
            scan,
            thumbnails,
            max_edge,
            output,
        } => run_list(&directory, &scan, thumbnails, max_edge, output),
        Commands::Preview { file, lines, open } => run_preview(&file, lines, open),
        Commands::Delete {
            directory,
            rows,
            scan,
            yes,
        } => run_delete(&directory, &rows, &scan, yes),
    }
}

type LastStatus = Rc<RefCell<Option<StatusUpdate>>>;

/// Build a coordinator and wait for its first scan
fn scan_directory(
    directory: &Path,
    args: &ScanArgs,
    max_edge: Option<u32>,
    show_progress: bool,
) -> Result<(SelectionCoordinator, LastStatus)> {
    if !directory.is_dir() {
        return Err(ScanError::DirectoryNotFound {
            path: directory.to_path_buf(),
        }
        .into());
    }

    let status: LastStatus = Rc::new(RefCell::new(None));
    let status_sink = status.clone();
    let (sender, receiver) = EventChannel::new();

    let mut browser = SelectionCoordinator::builder()
        .config(args.config(max_edge))
        .events(sender)
        .status_view(move |update: &StatusUpdate| {
            *status_sink.borrow_mut() = Some(update.clone());
        })
        .build()?;

    let spinner = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Scanning {}", display_path(directory)));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    browser.open_directory(directory);
    let landed = browser.finish_scan(Duration::from_secs(args.timeout));

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if landed.is_none() {
        return Err(BrowserError::Config(format!(
            "scan of {} did not finish within {}s",
            directory.display(),
            args.timeout
        )));
    }
    report_scan_failures(&receiver);

    Ok((browser, status))
}

fn report_scan_failures(receiver: &EventReceiver) {
    let term = Term::stderr();
    for event in receiver.drain() {
        if let Event::Scan(ScanEvent::Failed { message, .. }) = event {
            term.write_line(&format!("{} {}", style("!").yellow().bold(), message))
                .ok();
        }
    }
}

fn run_list(
    directory: &Path,
    args: &ScanArgs,
    thumbnails: bool,
    max_edge: Option<u32>,
    output: OutputFormat,
) -> Result<()> {
    let show_progress = matches!(output, OutputFormat::Pretty);
    let (mut browser, _status) = scan_directory(directory, args, max_edge, show_progress)?;

    let thumbs = if thumbnails {
        collect_thumbnails(&mut browser, Duration::from_secs(args.timeout))
    } else {
        Vec::new()
    };

    let entries = browser.list().entries();
    match output {
        OutputFormat::Pretty => print_pretty_list(directory, entries, &thumbs),
        OutputFormat::Json => print_json_list(directory, entries, &thumbs),
        OutputFormat::Minimal => {
            for entry in entries {
                println!("{}", entry.path().display());
            }
        }
    }

    Ok(())
}

fn collect_thumbnails(browser: &mut SelectionCoordinator, timeout: Duration) -> Vec<String> {
    let rows = browser.list().count();
    for row in 0..rows {
        browser.bind_thumbnail(SlotId(row), row);
    }
    browser.settle_thumbnails(timeout);

    (0..rows)
        .map(|row| match browser.slot_image(SlotId(row)) {
            SlotImage::Ready(thumb) => format!("{}x{}", thumb.width(), thumb.height()),
            SlotImage::Placeholder => "no preview".to_string(),
            SlotImage::Failed => "failed".to_string(),
            SlotImage::Loading => "pending".to_string(),
            SlotImage::Empty => String::new(),
        })
        .collect()
}

fn print_pretty_list(directory: &Path, entries: &[Entry], thumbs: &[String]) {
    let term = Term::stdout();

    term.write_line(&format!(
        "{} {}",
        style("Duplicate Browser").bold().cyan(),
        style(display_path(directory)).dim()
    ))
    .ok();
    term.write_line("").ok();

    if entries.is_empty() {
        term.write_line(&format!("  {}", style("No duplicates found").green()))
            .ok();
        return;
    }

    for (row, entry) in entries.iter().enumerate() {
        if entry.is_first_in_group() {
            term.write_line(&format!(
                "  {}",
                style(format!("Group {}", entry.group_index() + 1)).bold()
            ))
            .ok();
        }

        let branch = if entry.is_last_in_group() { "└" } else { "├" };
        let thumb = thumbs
            .get(row)
            .filter(|t| !t.is_empty())
            .map(|t| format!(" {}", style(format!("[{}]", t)).dim()))
            .unwrap_or_default();

        term.write_line(&format!(
            "  {} {:>4}  {} {}{}",
            style(branch).dim(),
            style(row).yellow(),
            display_path(entry.path()),
            style(entry.content_type()).dim(),
            thumb
        ))
        .ok();

        if entry.is_last_in_group() {
            term.write_line("").ok();
        }
    }
}

fn print_json_list(directory: &Path, entries: &[Entry], thumbs: &[String]) {
    let output = serde_json::json!({
        "directory": directory,
        "groups": entries.iter().filter(|e| e.is_first_in_group()).count(),
        "entries": entries.iter().enumerate().map(|(row, e)| {
            serde_json::json!({
                "row": row,
                "path": e.path(),
                "content_type": e.content_type(),
                "group": e.group_index(),
                "first_in_group": e.is_first_in_group(),
                "last_in_group": e.is_last_in_group(),
                "thumbnail": thumbs.get(row),
            })
        }).collect::<Vec<_>>()
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

fn run_preview(file: &Path, lines: usize, open: bool) -> Result<()> {
    let term = Term::stdout();

    let entry = flatten_groups(&[DuplicateGroup::new(vec![FoundFile::classify(file)])])
        .into_iter()
        .next();
    let mut dispatcher = PreviewDispatcher::default();
    let preview = dispatcher.show(entry.as_ref()).clone();

    match &preview {
        Preview::Empty => {}
        Preview::Image { image, .. } => {
            term.write_line(&format!(
                "{} {}x{}",
                style("image").cyan(),
                image.width(),
                image.height()
            ))
            .ok();
        }
        Preview::Video { path } => {
            term.write_line(&format!(
                "{} playing {}",
                style("video").cyan(),
                display_path(path)
            ))
            .ok();
        }
        Preview::Text {
            content, encoding, ..
        } => {
            term.write_line(&format!("{} {:?}", style("text").cyan(), encoding))
                .ok();
            for line in content.lines().take(lines) {
                term.write_line(line).ok();
            }
        }
        Preview::Unavailable { path } => {
            term.write_line(&format!(
                "{} no preview for {}",
                style("unavailable").yellow(),
                display_path(path)
            ))
            .ok();
        }
    }

    if open {
        if let Some(target) = dispatcher.external_target() {
            SystemFileOperations.open_default(target)?;
        }
    }
    dispatcher.hide();

    Ok(())
}

fn run_delete(directory: &Path, rows: &[usize], args: &ScanArgs, yes: bool) -> Result<()> {
    let term = Term::stderr();
    let (mut browser, status) = scan_directory(directory, args, None, true)?;

    browser.select(rows.iter().copied());
    let selected = browser.list().selected_indices();
    if selected.len() != rows.len() {
        term.write_line(&format!(
            "{} ignoring rows outside 0..{}",
            style("!").yellow().bold(),
            browser.list().count()
        ))
        .ok();
    }
    if let Some(update) = status.borrow().as_ref() {
        term.write_line(&format!("Selected: {}", style(&update.label).bold()))
            .ok();
    }

    if !yes {
        for row in &selected {
            if let Some(entry) = browser.list().get(*row) {
                term.write_line(&format!("  would trash {}", display_path(entry.path())))
                    .ok();
            }
        }
        term.write_line(&format!(
            "{}",
            style("Nothing was moved. Pass --yes to move these files to the trash.").dim()
        ))
        .ok();
        return Ok(());
    }

    let report = browser.delete_selected_files();

    for path in &report.trashed {
        term.write_line(&format!(
            "  {} {}",
            style("✓").green(),
            display_path(path)
        ))
        .ok();
    }
    for (path, error) in &report.failed {
        term.write_line(&format!(
            "  {} {}: {}",
            style("✗").red(),
            display_path(path),
            error
        ))
        .ok();
    }
    term.write_line(&format!(
        "{} moved to the trash, {} failed",
        style(report.trashed.len()).cyan(),
        style(report.failed.len()).cyan()
    ))
    .ok();

    Ok(())
}

fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(&home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}
