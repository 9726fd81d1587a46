use std::io::Write;
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// A blanket implementation exists for any type that implements `Write` and `Into<Stdio>`
/// (e.g. `std::io::Stdout`, `std::io::Stderr` or a `File` opened for a redirect).
pub trait Stdout: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> Stdout for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// One simple command as typed by the user: an operation name and its arguments.
///
/// Redirection tokens (`>`, `1>`, `2>`) are still part of `args` at this point;
/// they are stripped by [`crate::redirect::resolve`] right before the command runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    /// Name of the builtin or program to run. Never empty inside a [`CommandChain`].
    pub op: String,
    /// Arguments in the order they were typed.
    pub args: Vec<String>,
}

impl Command {
    pub fn new(op: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            op: op.into(),
            args,
        }
    }
}

/// Commands parsed from one input line, in the order they were joined by `&&`.
///
/// Each command's successor is the next element; the last command has none.
/// The chain is rebuilt for every line and dropped once it has been executed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandChain {
    commands: Vec<Command>,
}

impl CommandChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command. Commands without an operation name are dropped.
    pub fn push(&mut self, command: Command) {
        if !command.op.is_empty() {
            self.commands.push(command);
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a CommandChain {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

impl FromIterator<Command> for CommandChain {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        let mut chain = CommandChain::new();
        for command in iter {
            chain.push(command);
        }
        chain
    }
}
