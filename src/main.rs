// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};

use crate::subtitle_processor::{ErrorHandling, SliceBounds};
use crate::timestamp::{TimeOffset, Timestamp};

mod aligner;
mod errors;
mod file_utils;
mod language_utils;
mod subtitle_processor;
mod timestamp;

/// CLI wrapper for ErrorHandling to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliErrorHandling {
    Pass,
    Log,
    Raise,
}

impl From<CliErrorHandling> for ErrorHandling {
    fn from(cli_handling: CliErrorHandling) -> Self {
        match cli_handling {
            CliErrorHandling::Pass => ErrorHandling::Pass,
            CliErrorHandling::Log => ErrorHandling::Log,
            CliErrorHandling::Raise => ErrorHandling::Raise,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn parse_timestamp_arg(value: &str) -> Result<Timestamp, String> {
    Timestamp::parse(value).map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align two language tracks of the same media into one merged file
    Align(AlignArgs),

    /// Shift every entry of a subtitle file by an offset and/or ratio
    Shift(ShiftArgs),

    /// Sort a subtitle file by time and renumber its entries
    Clean(CleanArgs),

    /// Keep only the entries matching the given time bounds
    Slice(SliceArgs),

    /// Generate shell completions for subalign
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// First subtitle track
    #[arg(value_name = "FIRST")]
    first: PathBuf,

    /// Second subtitle track
    #[arg(value_name = "SECOND")]
    second: PathBuf,

    /// Language code of the first track (e.g. 'en', 'eng')
    #[arg(long)]
    first_lang: String,

    /// Language code of the second track (e.g. 'fr', 'fra')
    #[arg(long)]
    second_lang: String,

    /// Output file for the merged track
    #[arg(short, long)]
    output: PathBuf,

    /// Directory to write per-language corpus files into
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// How to handle malformed subtitle blocks
    #[arg(long, value_enum, default_value = "pass")]
    error_handling: CliErrorHandling,
}

#[derive(Parser, Debug)]
struct ShiftArgs {
    /// Input subtitle file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    hours: i64,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    minutes: i64,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    seconds: i64,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    milliseconds: i64,

    /// Scale factor, e.g. 25/23.976 framerate conversion
    #[arg(long, default_value_t = 1.0)]
    ratio: f64,

    /// How to handle malformed subtitle blocks
    #[arg(long, value_enum, default_value = "pass")]
    error_handling: CliErrorHandling,
}

#[derive(Parser, Debug)]
struct CleanArgs {
    /// Input subtitle file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// How to handle malformed subtitle blocks
    #[arg(long, value_enum, default_value = "pass")]
    error_handling: CliErrorHandling,
}

#[derive(Parser, Debug)]
struct SliceArgs {
    /// Input subtitle file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Keep entries starting before this time (HH:MM:SS,mmm)
    #[arg(long, value_parser = parse_timestamp_arg)]
    starts_before: Option<Timestamp>,

    /// Keep entries starting after this time (HH:MM:SS,mmm)
    #[arg(long, value_parser = parse_timestamp_arg)]
    starts_after: Option<Timestamp>,

    /// Keep entries ending before this time (HH:MM:SS,mmm)
    #[arg(long, value_parser = parse_timestamp_arg)]
    ends_before: Option<Timestamp>,

    /// Keep entries ending after this time (HH:MM:SS,mmm)
    #[arg(long, value_parser = parse_timestamp_arg)]
    ends_after: Option<Timestamp>,

    /// How to handle malformed subtitle blocks
    #[arg(long, value_enum, default_value = "pass")]
    error_handling: CliErrorHandling,
}

/// subalign - SRT subtitle alignment and manipulation
#[derive(Parser, Debug)]
#[command(name = "subalign")]
#[command(version = "0.1.0")]
#[command(about = "SRT subtitle parsing, manipulation and two-track alignment")]
#[command(long_about = "subalign parses SRT subtitle files, applies time-based \
transformations, and aligns two language tracks of the same media into a single \
merged track.

EXAMPLES:
    subalign align en.srt fr.srt --first-lang en --second-lang fr -o merged.srt
    subalign align en.srt fr.srt --first-lang en --second-lang fr -o merged.srt --corpus corpus/
    subalign shift movie.srt -o shifted.srt --seconds 2 --milliseconds 500
    subalign shift movie.srt -o rescaled.srt --ratio 1.042708
    subalign clean movie.srt -o cleaned.srt
    subalign slice movie.srt -o part.srt --starts-after 00:10:00,000 --ends-before 00:20:00,000
    subalign completions bash > subalign.bash")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = match record.level() {
                Level::Error => {
                    writeln!(stderr, "\x1B[1;31m{} ERROR {}\x1B[0m", now, record.args())
                }
                Level::Warn => {
                    writeln!(stderr, "\x1B[1;33m{} WARN  {}\x1B[0m", now, record.args())
                }
                Level::Info => writeln!(stderr, "{} INFO  {}", now, record.args()),
                Level::Debug => {
                    writeln!(stderr, "\x1B[2m{} DEBUG {}\x1B[0m", now, record.args())
                }
                Level::Trace => {
                    writeln!(stderr, "\x1B[2m{} TRACE {}\x1B[0m", now, record.args())
                }
            };
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    let level = options
        .log_level
        .map(LevelFilter::from)
        .unwrap_or(LevelFilter::Info);
    CustomLogger::init(level).map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    match options.command {
        Commands::Align(args) => run_align(args),
        Commands::Shift(args) => run_shift(args),
        Commands::Clean(args) => run_clean(args),
        Commands::Slice(args) => run_slice(args),
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn run_align(args: AlignArgs) -> Result<()> {
    let first_lang = language_utils::normalize_tag(&args.first_lang)
        .with_context(|| format!("Invalid --first-lang: {}", args.first_lang))?;
    let second_lang = language_utils::normalize_tag(&args.second_lang)
        .with_context(|| format!("Invalid --second-lang: {}", args.second_lang))?;
    if language_utils::codes_match(&first_lang, &second_lang) {
        return Err(anyhow!("The two tracks must carry distinct languages"));
    }
    info!(
        "aligning {} ({}) with {} ({})",
        args.first.display(),
        language_utils::language_name(&first_lang)?,
        args.second.display(),
        language_utils::language_name(&second_lang)?
    );

    let handling = ErrorHandling::from(args.error_handling);
    let mut first = file_utils::open_subtitle_file(&args.first, handling)?;
    let mut second = file_utils::open_subtitle_file(&args.second, handling)?;

    // The aligner's two-pointer scan assumes monotonic timing in each track
    first.normalize();
    second.normalize();
    first.set_language(&first_lang);
    second.set_language(&second_lang);

    let merged = aligner::align(&first, &second);
    info!(
        "aligned {} + {} entries into {} merged entries",
        first.len(),
        second.len(),
        merged.len()
    );

    // Merged entries carry their text per language; flatten for display
    for entry in &merged.entries {
        let mut entry = entry.borrow_mut();
        entry.text = entry
            .lang_map
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
    }

    file_utils::save_subtitle_file(&merged, &args.output, None)?;
    info!("wrote merged track to {}", args.output.display());

    if let Some(corpus_root) = &args.corpus {
        file_utils::build_corpus(&merged, corpus_root)?;
        info!(
            "wrote corpus files for [{}] under {}",
            merged.langs.join(", "),
            corpus_root.display()
        );
    }
    Ok(())
}

fn run_shift(args: ShiftArgs) -> Result<()> {
    let collection =
        file_utils::open_subtitle_file(&args.input, ErrorHandling::from(args.error_handling))?;
    collection.shift(TimeOffset {
        hours: args.hours,
        minutes: args.minutes,
        seconds: args.seconds,
        milliseconds: args.milliseconds,
        ratio: args.ratio,
    });
    file_utils::save_subtitle_file(&collection, &args.output, None)?;
    info!(
        "shifted {} entries into {}",
        collection.len(),
        args.output.display()
    );
    Ok(())
}

fn run_clean(args: CleanArgs) -> Result<()> {
    let mut collection =
        file_utils::open_subtitle_file(&args.input, ErrorHandling::from(args.error_handling))?;
    collection.normalize();
    file_utils::save_subtitle_file(&collection, &args.output, None)?;
    info!(
        "cleaned {} entries into {}",
        collection.len(),
        args.output.display()
    );
    Ok(())
}

fn run_slice(args: SliceArgs) -> Result<()> {
    let collection =
        file_utils::open_subtitle_file(&args.input, ErrorHandling::from(args.error_handling))?;
    let sliced = collection.slice(SliceBounds {
        starts_before: args.starts_before,
        starts_after: args.starts_after,
        ends_before: args.ends_before,
        ends_after: args.ends_after,
    });
    file_utils::save_subtitle_file(&sliced, &args.output, None)?;
    info!(
        "kept {} of {} entries into {}",
        sliced.len(),
        collection.len(),
        args.output.display()
    );
    Ok(())
}
