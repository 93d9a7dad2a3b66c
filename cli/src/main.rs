//! dirsync - Command-line interface for the sync engine.
//!
//! Parses arguments, opens the log file, asks for the sync direction and
//! prints a one-line summary. Details of each copy, delete and failure go to
//! the log file only.

use clap::{Parser, ValueEnum};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use dirsync::{
    prepare_sync, run_sync, AccessError, Confirmer, LocalFs, SyncJob, SyncLogger, SyncMode,
    SyncOptions, SyncOutcome, SyncResult, TracingLogger,
};

const DEFAULT_LOG_FILE: &str = "directory_sync.log";
const LOG_TIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// dirsync - Synchronize two same-named directories in one direction
#[derive(Parser, Debug)]
#[command(name = "dirsync")]
#[command(version)]
#[command(about = "Make a destination directory match a same-named source directory")]
struct Args {
    /// The source path from which files will be copied
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// The destination path; the folder that will be updated
    #[arg(value_name = "DESTINATION")]
    destination: PathBuf,

    /// Keep files and folders that exist only in the destination
    #[arg(short, long)]
    merge: bool,

    /// Minimum severity written to the log file
    #[arg(long, visible_alias = "ll", value_enum, ignore_case = true, default_value = "WARN")]
    log_level: LogLevel,

    /// Run without FROM-TO directional confirmation
    #[arg(short = 'y', long)]
    skip_confirmation: bool,

    /// Log file path, relative to the current directory unless absolute
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

/// Log file severity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    #[value(alias = "FATAL")]
    Crit,
}

impl LogLevel {
    /// `tracing` has no level above ERROR, so CRIT shares it.
    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Crit => LevelFilter::ERROR,
        }
    }
}

/// How a run that got past validation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    Clean,
    ErrorsOccurred,
}

/// Writes everything to the log and announces each directory on stdout.
struct CliLogger {
    log: TracingLogger,
}

impl SyncLogger for CliLogger {
    fn on_sync_started(&self, job: &SyncJob) {
        self.log.on_sync_started(job);
    }

    fn on_directory_started(&self, source_dir: &Path, dest_dir: &Path) {
        println!("Traversing: \"{}\"", source_dir.display());
        self.log.on_directory_started(source_dir, dest_dir);
    }

    fn on_deleted(&self, path: &Path) {
        self.log.on_deleted(path);
    }

    fn on_copied(&self, src: &Path, dst: &Path) {
        self.log.on_copied(src, dst);
    }

    fn on_updated(&self, src: &Path, dst: &Path) {
        self.log.on_updated(src, dst);
    }

    fn on_unchanged(&self, src: &Path) {
        self.log.on_unchanged(src);
    }

    fn on_failure(&self, error: &AccessError) {
        self.log.on_failure(error);
    }

    fn on_sync_completed(&self, job: &SyncJob, outcome: &SyncOutcome) {
        self.log.on_sync_completed(job, outcome);
    }
}

/// Asks on the terminal until the user answers y or n.
struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, source: &Path, destination: &Path) -> bool {
        let stdin = io::stdin();
        let stdout = io::stdout();
        prompt_direction(&mut stdin.lock(), &mut stdout.lock(), source, destination)
    }
}

/// Repeat the direction prompt until a y/n answer; end of input declines.
fn prompt_direction(
    input: &mut impl BufRead,
    output: &mut impl Write,
    source: &Path,
    destination: &Path,
) -> bool {
    loop {
        let _ = writeln!(
            output,
            "Folders to sync:\n  FROM: \"{}\"\n  TO:   \"{}\"\n",
            source.display(),
            destination.display()
        );
        let _ = write!(
            output,
            "Files in destination folder may be deleted. Is this the correct sync direction? (y/n): "
        );
        let _ = output.flush();

        let mut answer = String::new();
        match input.read_line(&mut answer) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }

        match answer.trim().to_lowercase().as_str() {
            "y" => return true,
            "n" => return false,
            _ => continue,
        }
    }
}

fn open_log_file(path: &Path) -> Result<File, String> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Could not open log file {}: {}", path.display(), e))
}

fn absolute_log_path(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| format!("Could not determine current directory: {}", e))
}

/// Parse and validate command-line arguments, then run the sync
fn main() {
    let args = Args::parse();

    let exit_code = match run_cli(&args, &TerminalConfirmer) {
        Ok(RunStatus::Clean) => 0,
        Ok(RunStatus::ErrorsOccurred) => 1,
        Err(msg) => {
            eprintln!("[ERROR] {}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main CLI logic - separated for testability
fn run_cli(args: &Args, confirmer: &dyn Confirmer) -> Result<RunStatus, String> {
    let options = SyncOptions {
        mode: SyncMode::from_merge_flag(args.merge),
        skip_confirmation: args.skip_confirmation,
    };

    let job = prepare_sync(&args.source, &args.destination, options).map_err(|e| e.to_string())?;

    if job.same_location {
        println!("\nA path is always synced with itself.");
        return Ok(RunStatus::Clean);
    }

    let log_path = absolute_log_path(&args.log_file)?;
    let log_file = open_log_file(&log_path)?;
    println!("Writing to file:\n{}\n", log_path.display());

    // The subscriber, and with it the log file, lives exactly as long as the run.
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_max_level(args.log_level.filter())
        .finish();

    let logger = CliLogger { log: TracingLogger };
    let result = tracing::subscriber::with_default(subscriber, || {
        run_sync(&job, &LocalFs, &logger, confirmer)
    });

    match result {
        SyncResult::AlreadyInSync => {
            println!("\nA path is always synced with itself.");
            Ok(RunStatus::Clean)
        }
        SyncResult::Declined => {
            println!("Exiting program.\n");
            Ok(RunStatus::Clean)
        }
        SyncResult::Completed(outcome) => {
            let stats = outcome.stats;
            if outcome.errors_occurred {
                println!(
                    "Some errors occurred during synchronization. Check the log file:\n{}\n",
                    log_path.display()
                );
            }
            println!(
                "\nSynchronization complete: {} copied, {} updated, {} deleted across {} directories.\n",
                stats.files_copied + stats.trees_copied,
                stats.files_updated,
                stats.entries_deleted,
                stats.directories_compared
            );
            if outcome.errors_occurred {
                Ok(RunStatus::ErrorsOccurred)
            } else {
                Ok(RunStatus::Clean)
            }
        }
    }
}
