use crate::command::ExitCode;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Short names that stand for longer filesystem paths, e.g. `~` for `$HOME`.
///
/// An alias is only expanded when it is the whole path or its leading
/// component (`~`, `~/notes`); `a~b` is left alone. The table is built once
/// per session and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAliases {
    entries: Vec<(String, String)>,
}

impl PathAliases {
    /// The standard table: `~` maps to `home` when a home directory is known.
    pub fn with_home(home: Option<String>) -> Self {
        let mut entries = Vec::new();
        if let Some(home) = home {
            entries.push(("~".to_string(), home));
        }
        Self { entries }
    }

    /// Replace a leading alias component in `path`.
    pub fn expand(&self, path: &str) -> String {
        for (alias, target) in &self.entries {
            if path == alias {
                return target.clone();
            }
            if let Some(rest) = path.strip_prefix(alias.as_str()) {
                if rest.starts_with('/') {
                    return format!("{target}{rest}");
                }
            }
        }
        path.to_string()
    }
}

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: a map of environment variables that will be visible to executed commands.
/// - `current_dir`: the working directory for command execution.
/// - `aliases`: path shortcuts applied to `cd` targets and redirect targets.
/// - `should_exit`: set by `exit`; a REPL loop checks it to know when to terminate.
///
/// Note: fields are public to keep the struct easy to build in tests.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Path alias table, fixed at startup.
    pub aliases: PathAliases,
    /// When set, the session should end with this status.
    pub should_exit: Option<ExitCode>,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()`, initializes `current_dir`
    /// from `std::env::current_dir()` and builds the alias table from `HOME`.
    pub fn new() -> Self {
        let vars: HashMap<String, String> = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let aliases = PathAliases::with_home(vars.get("HOME").cloned());
        Self {
            vars,
            current_dir,
            aliases,
            should_exit: None,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Expand aliases in a user-supplied path and anchor it at `current_dir`.
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let expanded = PathBuf::from(self.aliases.expand(raw));
        if expanded.is_absolute() {
            expanded
        } else {
            self.current_dir.join(expanded)
        }
    }

    /// The colon-separated list of directories searched for executables.
    pub fn search_path(&self) -> Option<String> {
        self.get_var("PATH")
    }

    pub(crate) fn set_current_dir(&mut self, dir: &Path) -> std::io::Result<()> {
        stdenv::set_current_dir(dir)?;
        self.current_dir = dir.to_path_buf();
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
