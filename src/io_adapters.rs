use crate::command::Stdout;
use std::cell::RefCell;
use std::io::{Result as IoResult, Write};
use std::process::Stdio;
use std::rc::Rc;

/// Where "the terminal" is for a shell session.
///
/// Commands without a redirect write to these streams. The real shell uses
/// the process's own stdout/stderr; tests swap in memory buffers.
pub trait Terminal {
    fn stdout(&self) -> Box<dyn Stdout>;
    fn stderr(&self) -> Box<dyn Stdout>;
}

/// The streams this process inherited from its parent.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminal;

impl Terminal for ProcessTerminal {
    fn stdout(&self) -> Box<dyn Stdout> {
        Box::new(std::io::stdout())
    }

    fn stderr(&self) -> Box<dyn Stdout> {
        Box::new(std::io::stderr())
    }
}

/// Memory-backed writer for capturing output from builtins.
///
/// Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl Stdout for MemWriter {
    /// Child processes cannot write into process memory, so their output is discarded.
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::null()
    }
}

/// A terminal whose two streams are captured in memory.
#[derive(Clone, Default)]
pub struct MemTerminal {
    pub out: MemWriter,
    pub err: MemWriter,
}

impl MemTerminal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Terminal for MemTerminal {
    fn stdout(&self) -> Box<dyn Stdout> {
        Box::new(self.out.clone())
    }

    fn stderr(&self) -> Box<dyn Stdout> {
        Box::new(self.err.clone())
    }
}
