use crate::builtin::{BuiltinCommand, Cd, Clear, Echo, Exit, Pwd, Type};
use std::collections::HashMap;

/// Name lookup table for builtin commands.
///
/// Built once when a session starts and only read afterwards. The dispatcher
/// consults it before searching `PATH`, and `type` uses it to tell builtins
/// apart from programs.
pub struct BuiltinRegistry {
    commands: HashMap<&'static str, Box<dyn BuiltinCommand>>,
}

impl BuiltinRegistry {
    /// A registry with no builtins at all; every name goes to `PATH`.
    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Add a builtin under its own name, replacing any previous one.
    pub fn with(mut self, command: impl BuiltinCommand + 'static) -> Self {
        self.commands.insert(command.name(), Box::new(command));
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn BuiltinCommand> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All builtin names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for BuiltinRegistry {
    /// The standard set: `exit`, `echo`, `type`, `pwd`, `cd`, `clear` and `cls`.
    fn default() -> Self {
        Self::empty()
            .with(Exit)
            .with(Echo)
            .with(Type)
            .with(Pwd)
            .with(Cd)
            .with(Clear::named("clear"))
            .with(Clear::named("cls"))
    }
}
