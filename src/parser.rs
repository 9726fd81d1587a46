//! Turns one raw input line into a [`CommandChain`].
//!
//! The grammar is deliberately small: words separated by spaces, single and
//! double quotes, backslash escapes and the `&&` conjunction. Malformed input
//! is never rejected; an unterminated quote simply runs to the end of the line.

use crate::command::{Command, CommandChain};
use log::debug;

const BACKSLASH: char = '\\';
const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';
const AMPERSAND: char = '&';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    None,
    Single,
    Double,
}

struct ParsingFSM {
    input: Vec<char>,
    pos: usize,
    quoting: Quoting,
    pending_escape: bool,
    /// True until the operation name of the current command has been flushed.
    expect_op: bool,
    token: String,
    current: Command,
    chain: CommandChain,
}

impl ParsingFSM {
    fn new(line: &str) -> Self {
        ParsingFSM {
            input: line.chars().collect(),
            pos: 0,
            quoting: Quoting::None,
            pending_escape: false,
            expect_op: true,
            token: String::new(),
            current: Command::default(),
            chain: CommandChain::new(),
        }
    }

    fn make_chain(mut self) -> CommandChain {
        while let Some(ch) = self.read_char() {
            self.handle_char(ch);
        }
        // Unterminated quotes are treated as closed; a dangling backslash is dropped.
        self.push_command();
        self.chain
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_char(&mut self, ch: char) {
        if self.pending_escape {
            self.token.push(ch);
            self.pending_escape = false;
            return;
        }

        match (ch, self.quoting) {
            (BACKSLASH, Quoting::None | Quoting::Double) => self.pending_escape = true,
            (SINGLE_QUOTE, Quoting::None) => self.quoting = Quoting::Single,
            (SINGLE_QUOTE, Quoting::Single) => self.quoting = Quoting::None,
            (DOUBLE_QUOTE, Quoting::None) => self.quoting = Quoting::Double,
            (DOUBLE_QUOTE, Quoting::Double) => self.quoting = Quoting::None,
            (AMPERSAND, Quoting::None) if self.peek_char() == Some(AMPERSAND) => {
                self.read_char();
                self.push_command();
            }
            (' ', Quoting::None) => self.flush_token(),
            (c, _) => self.token.push(c),
        }
    }

    /// Move the token under construction into the current command.
    /// No-op on an empty token, which is what collapses runs of spaces.
    fn flush_token(&mut self) {
        if self.token.is_empty() {
            return;
        }
        let token = std::mem::take(&mut self.token);
        if self.expect_op {
            self.current.op = token;
            self.expect_op = false;
        } else {
            self.current.args.push(token);
        }
    }

    fn push_command(&mut self) {
        self.flush_token();
        let command = std::mem::take(&mut self.current);
        if !command.op.is_empty() {
            self.chain.push(command);
        }
        self.expect_op = true;
    }
}

/// Parse a line into the chain of commands it contains.
///
/// Parsing is pure: the same line always produces an equal chain.
pub fn parse(line: &str) -> CommandChain {
    let chain = ParsingFSM::new(line).make_chain();
    debug!("parsed {:?} into {:?}", line, chain);
    chain
}
