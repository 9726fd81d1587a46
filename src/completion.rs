//! Tab completion of builtin names for the interactive line editor.

use crate::registry::BuiltinRegistry;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Completes the word under the cursor when it is in command position, i.e.
/// the first word of the line or the first word after an `&&`.
pub struct BuiltinCompleter {
    names: Vec<&'static str>,
}

impl BuiltinCompleter {
    pub fn new(builtins: &BuiltinRegistry) -> Self {
        Self {
            names: builtins.names(),
        }
    }

    /// Start of the word being completed and the builtin names it can become.
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<&'static str>) {
        let head = &line[..pos];
        let start = head.rfind(|c: char| c == ' ' || c == '&').map_or(0, |i| i + 1);
        let before = head[..start].trim_end();
        if !(before.is_empty() || before.ends_with("&&")) {
            return (start, Vec::new());
        }
        let prefix = &head[start..];
        let matches = self
            .names
            .iter()
            .copied()
            .filter(|name| name.starts_with(prefix))
            .collect();
        (start, matches)
    }
}

impl Completer for BuiltinCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.candidates(line, pos);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: format!("{name} "),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for BuiltinCompleter {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for BuiltinCompleter {}

impl Validator for BuiltinCompleter {}

impl Helper for BuiltinCompleter {}
