use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::locate_path;
use crate::registry::BuiltinRegistry;
use anyhow::anyhow;
use std::fs;
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process without spawning a child. They receive their
/// arguments with redirections already stripped.
pub trait BuiltinCommand {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name(&self) -> &'static str;

    /// Executes the command, writing to `stdout` (already pointed at its redirect target).
    ///
    /// `builtins` is the registry the command was found in, for commands
    /// that need to know about their siblings (`type`).
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        &self,
        args: &[String],
        stdout: &mut dyn Write,
        env: &mut Environment,
        builtins: &BuiltinRegistry,
    ) -> Result<ExitCode, ShellError>;
}

fn write_err(e: std::io::Error) -> ShellError {
    ShellError::io("write error", e)
}

/// Leave the shell, optionally with a status code.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(
        &self,
        args: &[String],
        _stdout: &mut dyn Write,
        env: &mut Environment,
        _builtins: &BuiltinRegistry,
    ) -> Result<ExitCode, ShellError> {
        let code = match args {
            [] => 0,
            [code] => code.parse::<ExitCode>().map_err(|_| ShellError::Conversion {
                name: "exit",
                value: code.clone(),
            })?,
            _ => {
                return Err(ShellError::Arity {
                    name: "exit",
                    expected: "0 or 1",
                    received: args.len(),
                });
            }
        };
        env.should_exit = Some(code);
        Ok(0)
    }
}

/// Write the arguments to standard output, separated by spaces, with a trailing newline.
pub struct Echo;

impl BuiltinCommand for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn execute(
        &self,
        args: &[String],
        stdout: &mut dyn Write,
        _env: &mut Environment,
        _builtins: &BuiltinRegistry,
    ) -> Result<ExitCode, ShellError> {
        writeln!(stdout, "{}", args.join(" ")).map_err(write_err)?;
        Ok(0)
    }
}

/// Tell whether a name is a builtin or which executable it runs.
pub struct Type;

impl BuiltinCommand for Type {
    fn name(&self) -> &'static str {
        "type"
    }

    fn execute(
        &self,
        args: &[String],
        stdout: &mut dyn Write,
        env: &mut Environment,
        builtins: &BuiltinRegistry,
    ) -> Result<ExitCode, ShellError> {
        let [name] = args else {
            return Err(ShellError::Arity {
                name: "type",
                expected: "1",
                received: args.len(),
            });
        };

        if builtins.contains(name) {
            writeln!(stdout, "{name} is a shell builtin").map_err(write_err)?;
            return Ok(0);
        }

        let written = match locate_path(env, name) {
            Some(path) => writeln!(stdout, "{name} is {}", path.display()),
            None => writeln!(stdout, "{name}: not found"),
        };
        written.map_err(write_err)?;
        Ok(0)
    }
}

/// Print the current working directory to standard output.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(
        &self,
        _args: &[String],
        stdout: &mut dyn Write,
        env: &mut Environment,
        _builtins: &BuiltinRegistry,
    ) -> Result<ExitCode, ShellError> {
        writeln!(stdout, "{}", env.current_dir.display()).map_err(write_err)?;
        Ok(0)
    }
}

/// Change the current working directory.
///
/// The target goes through the path alias table, so `cd ~` and `cd ~/src` work.
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(
        &self,
        args: &[String],
        _stdout: &mut dyn Write,
        env: &mut Environment,
        _builtins: &BuiltinRegistry,
    ) -> Result<ExitCode, ShellError> {
        let target = match args {
            [] => return Err(anyhow!("cd: no directory specified").into()),
            [target] => target,
            _ => {
                return Err(ShellError::Arity {
                    name: "cd",
                    expected: "1",
                    received: args.len(),
                });
            }
        };

        let new_dir = env.resolve_path(target);
        let canonical = match fs::canonicalize(&new_dir) {
            Ok(dir) if dir.is_dir() => dir,
            _ => return Err(ShellError::NoSuchDirectory(target.clone())),
        };
        env.set_current_dir(&canonical)
            .map_err(|e| ShellError::io(format!("cd: can't chdir to {}", canonical.display()), e))?;
        Ok(0)
    }
}

/// Clear the terminal screen.
///
/// Registered under both `clear` and `cls`.
pub struct Clear {
    name: &'static str,
}

impl Clear {
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

impl BuiltinCommand for Clear {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(
        &self,
        _args: &[String],
        stdout: &mut dyn Write,
        _env: &mut Environment,
        _builtins: &BuiltinRegistry,
    ) -> Result<ExitCode, ShellError> {
        write!(stdout, "{CLEAR_SCREEN}").map_err(write_err)?;
        stdout.flush().map_err(write_err)?;
        Ok(0)
    }
}
