use crate::command::ExitCode;
use std::path::Path;

/// Status reported for a command name that resolves to nothing.
pub const NOT_FOUND_STATUS: ExitCode = 127;

/// Everything that can go wrong while dispatching a single command.
///
/// All variants are recovered by the interpreter: they are printed to the
/// error stream and stop the current `&&` chain, but the shell keeps running.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A builtin was invoked with the wrong number of arguments.
    #[error("{name}: expected {expected} argument(s), received {received}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        received: usize,
    },

    /// An argument could not be converted to the type the builtin needs.
    #[error("{name}: {value}: numeric argument required")]
    Conversion { name: &'static str, value: String },

    /// Neither a builtin nor an executable on the search path.
    #[error("{0}: command not found")]
    NotFound(String),

    /// A redirect target or a child process could not be set up.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program ran but reported failure.
    #[error("{name}: exited with status {code}")]
    ExternalFailure { name: String, code: ExitCode },

    /// `cd` target does not exist or is not a directory.
    #[error("cd: {0}: No such file or directory")]
    NoSuchDirectory(String),

    /// The message already went to the command's redirected stderr; only the status is left.
    #[error("command failed with status {0}")]
    Reported(ExitCode),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShellError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ShellError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn create_failed(what: &str, path: &Path, source: std::io::Error) -> Self {
        ShellError::io(format!("cannot create {what} {}", path.display()), source)
    }

    /// Shell status equivalent of this error, as `$?` would report it.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellError::NotFound(_) => NOT_FOUND_STATUS,
            ShellError::ExternalFailure { code, .. } => *code,
            ShellError::Reported(code) => *code,
            _ => 1,
        }
    }
}
