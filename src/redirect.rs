//! Output redirection: `>`/`1>` for stdout and `2>` for stderr.
//!
//! Operators are whole words; the target is always the next word. `>>`,
//! `2>&1` and input redirection are not recognised and stay plain arguments.

use crate::command::Stdout;
use crate::env::Environment;
use crate::error::ShellError;
use crate::io_adapters::Terminal;
use log::debug;
use regex::Regex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static REDIRECT_OP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<fd>[12])?>$").expect("redirect operator pattern is valid")
});

/// One of the two output streams a command can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    /// Which stream a word redirects, if it is a redirect operator at all.
    pub fn from_operator(word: &str) -> Option<Stream> {
        let caps = REDIRECT_OP.captures(word)?;
        match caps.name("fd").map(|m| m.as_str()) {
            Some("2") => Some(Stream::Stderr),
            _ => Some(Stream::Stdout),
        }
    }
}

/// Where one output stream of a command ends up.
#[derive(Debug)]
pub enum OutputTarget {
    /// The shell's own stream.
    Inherit(Stream),
    /// A freshly truncated file. Closed when the target is dropped.
    File { path: PathBuf, file: File },
}

impl OutputTarget {
    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputTarget::Inherit(_) => None,
            OutputTarget::File { path, .. } => Some(path),
        }
    }

    pub fn is_inherited(&self) -> bool {
        matches!(self, OutputTarget::Inherit(_))
    }

    /// Turn the target into a writer, taking inherited streams from `terminal`.
    pub fn into_writer(self, terminal: &dyn Terminal) -> Box<dyn Stdout> {
        match self {
            OutputTarget::Inherit(Stream::Stdout) => terminal.stdout(),
            OutputTarget::Inherit(Stream::Stderr) => terminal.stderr(),
            OutputTarget::File { file, .. } => Box::new(file),
        }
    }
}

/// A command's arguments with the redirections taken out, and where its output goes.
#[derive(Debug)]
pub struct Redirected {
    pub args: Vec<String>,
    pub stdout: OutputTarget,
    pub stderr: OutputTarget,
}

/// Split redirections off `args` and open their targets.
///
/// The first operator for each stream wins; a repeated operator for a stream
/// that is already redirected, or an operator with nothing after it, is kept
/// as an ordinary argument. Missing parent directories of a target are created.
pub fn resolve(args: &[String], env: &Environment) -> Result<Redirected, ShellError> {
    let mut kept = Vec::with_capacity(args.len());
    let mut stdout = OutputTarget::Inherit(Stream::Stdout);
    let mut stderr = OutputTarget::Inherit(Stream::Stderr);

    let mut words = args.iter();
    while let Some(word) = words.next() {
        let stream = Stream::from_operator(word);
        let slot = match stream {
            Some(Stream::Stdout) if stdout.is_inherited() => &mut stdout,
            Some(Stream::Stderr) if stderr.is_inherited() => &mut stderr,
            _ => {
                kept.push(word.clone());
                continue;
            }
        };
        let Some(target) = words.next() else {
            kept.push(word.clone());
            break;
        };
        let path = env.resolve_path(target);
        debug!("redirecting {:?} to {}", stream, path.display());
        *slot = open_target(path)?;
    }

    Ok(Redirected {
        args: kept,
        stdout,
        stderr,
    })
}

fn open_target(path: PathBuf) -> Result<OutputTarget, ShellError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| ShellError::create_failed("directory", dir, e))?;
    }
    let file = File::create(&path).map_err(|e| ShellError::create_failed("file", &path, e))?;
    Ok(OutputTarget::File { path, file })
}
