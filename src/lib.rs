//! A small interactive shell with `&&` chaining and output redirection.
//!
//! A line is split into words (single quotes, double quotes and backslash
//! escapes are understood), cut into commands at every unquoted `&&`, and the
//! commands are run one after another for as long as they succeed. Each
//! command is either a builtin implemented in Rust or a program found on
//! `PATH`; `>`/`1>` and `2>` send its output to a file.
//!
//! The main entry point is [`Interpreter`]. [`parse`] exposes the parser on
//! its own, and the public modules [`command`], [`env`], [`builtin`] and
//! [`registry`] expose the types needed to embed the shell or add builtins.

pub mod builtin;
pub mod command;
mod completion;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod logging;
mod parser;
pub mod redirect;
pub mod registry;

pub use error::ShellError;
pub use external::find_command_path;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{DEFAULT_PROMPT, Interpreter};
pub use parser::parse;
