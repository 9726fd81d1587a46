//! Logger setup for the `myshell` binary.
//!
//! Warnings always go to stderr. With debug logging on, every record down to
//! `debug` is also appended to a file, so a session can be traced without
//! cluttering the terminal.

use anyhow::{Context, Result};
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Default file for `--debug` output, relative to the shell's start directory.
pub const DEFAULT_LOG_FILE: &str = "debug.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Append debug records to `file`.
    pub debug: bool,
    pub file: PathBuf,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            debug: false,
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

fn loggers(options: &LogOptions) -> Result<Vec<Box<dyn SharedLogger>>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));
    if options.debug {
        let file = open_log_file(&options.file)?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
    }
    Ok(loggers)
}

/// Install the global logger. Fails if the log file cannot be opened or a
/// logger is already installed.
pub fn init(options: &LogOptions) -> Result<()> {
    CombinedLogger::init(loggers(options)?).context("cannot install logger")
}
