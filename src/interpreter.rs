use crate::command::{Command, CommandChain, ExitCode};
use crate::completion::BuiltinCompleter;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::io_adapters::{ProcessTerminal, Terminal};
use crate::parser;
use crate::redirect;
use crate::registry::BuiltinRegistry;
use log::{debug, warn};
use rustyline::Editor;
use rustyline::history::DefaultHistory;
use rustyline::error::ReadlineError;
use std::io::Write;
use std::path::Path;

/// Default REPL prompt.
pub const DEFAULT_PROMPT: &str = "$ ";

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns an [`Environment`], the [`BuiltinRegistry`] it was
/// created with, and the [`Terminal`] that un-redirected output goes to.
/// Lines are parsed into `&&` chains and run left to right; the first command
/// that fails ends the chain.
///
/// Example
/// ```
/// use myshell::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run("echo", &["hello", "world"]).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: BuiltinRegistry,
    terminal: Box<dyn Terminal>,
    last_status: ExitCode,
}

impl Interpreter {
    /// Create an interpreter over the current process environment.
    pub fn new(builtins: BuiltinRegistry, terminal: Box<dyn Terminal>) -> Self {
        Self::with_env(Environment::new(), builtins, terminal)
    }

    pub fn with_env(
        env: Environment,
        builtins: BuiltinRegistry,
        terminal: Box<dyn Terminal>,
    ) -> Self {
        Self {
            env,
            builtins,
            terminal,
            last_status: 0,
        }
    }

    /// Status of the most recent line, as `$?` would report it.
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// Set once `exit` has run; the session should end with this status.
    pub fn exit_requested(&self) -> Option<ExitCode> {
        self.env.should_exit
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Redirection words among `args` are honoured. Returns the command's exit
    /// code or an error if the command cannot be found or fails to start.
    pub fn run(&mut self, name: &str, args: &[&str]) -> Result<ExitCode, ShellError> {
        let command = Command::new(name, args.iter().map(|a| a.to_string()).collect());
        self.execute_command(&command)
    }

    /// Parse and run one input line.
    pub fn execute_line(&mut self, line: &str) -> Result<ExitCode, ShellError> {
        let chain = parser::parse(line);
        self.execute_chain(&chain)
    }

    /// Run every command in `chain` in order while they keep succeeding.
    ///
    /// A command succeeds when it exits with status 0. Any error, non-zero
    /// status or `exit` request stops the chain before the next command.
    pub fn execute_chain(&mut self, chain: &CommandChain) -> Result<ExitCode, ShellError> {
        let mut status = 0;
        for (index, command) in chain.iter().enumerate() {
            debug!("chain[{}/{}]: {:?}", index + 1, chain.len(), command);
            status = self.execute_command(command)?;
            if status != 0 || self.env.should_exit.is_some() {
                break;
            }
        }
        Ok(status)
    }

    /// Run a line and report any error on the terminal's error stream.
    ///
    /// Returns the line's status; errors map to their shell status.
    pub fn eval(&mut self, line: &str) -> ExitCode {
        let status = match self.execute_line(line) {
            Ok(status) => status,
            Err(err) => {
                self.report(&err);
                err.exit_code()
            }
        };
        self.last_status = status;
        status
    }

    /// Print an error for the user. Never fails; a broken stderr is only logged.
    ///
    /// Errors already written to a redirected stderr are not printed again.
    pub fn report(&self, err: &ShellError) {
        debug!("command failed: {err:?}");
        if let ShellError::Reported(_) = err {
            return;
        }
        let mut stderr = self.terminal.stderr();
        if let Err(e) = writeln!(stderr, "{err}").and_then(|_| stderr.flush()) {
            warn!("cannot report error: {e}");
        }
    }

    fn execute_command(&mut self, command: &Command) -> Result<ExitCode, ShellError> {
        if let Some(builtin) = self.builtins.lookup(&command.op) {
            debug!("{} is a builtin", command.op);
            let redirected = redirect::resolve(&command.args, &self.env)?;
            let stderr_file = redirected.stderr.path().map(Path::to_path_buf);
            let mut stdout = redirected.stdout.into_writer(self.terminal.as_ref());
            let mut stderr = redirected.stderr.into_writer(self.terminal.as_ref());
            let result =
                builtin.execute(&redirected.args, &mut stdout, &mut self.env, &self.builtins);
            stdout
                .flush()
                .map_err(|e| ShellError::io(format!("{}: write error", command.op), e))?;
            return match (result, stderr_file) {
                (Err(err), Some(path)) => {
                    debug!("{} failed, error goes to {}", command.op, path.display());
                    writeln!(stderr, "{err}")
                        .and_then(|_| stderr.flush())
                        .map_err(|e| ShellError::io(format!("{}: write error", command.op), e))?;
                    Err(ShellError::Reported(err.exit_code()))
                }
                (result, _) => result,
            };
        }

        let Some(external) = ExternalCommand::locate(&self.env, &command.op) else {
            return Err(ShellError::NotFound(command.op.clone()));
        };
        debug!("{} resolved to {}", command.op, external.path().display());
        let redirected = redirect::resolve(&command.args, &self.env)?;
        let stdout = redirected.stdout.into_writer(self.terminal.as_ref());
        let stderr = redirected.stderr.into_writer(self.terminal.as_ref());
        match external.execute(&redirected.args, stdout, stderr, &self.env)? {
            0 => Ok(0),
            code => Err(ShellError::ExternalFailure {
                name: command.op.clone(),
                code,
            }),
        }
    }

    /// Read-Eval-Print Loop over the line editor.
    ///
    /// Builtin names complete on Tab. Ctrl-C drops the current line, Ctrl-D
    /// ends the session. Returns the
    /// status the session ended with.
    pub fn repl(&mut self, prompt: &str) -> rustyline::Result<ExitCode> {
        let mut rl: Editor<BuiltinCompleter, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(BuiltinCompleter::new(&self.builtins)));

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    self.eval(&line);
                    if let Some(code) = self.env.should_exit {
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(self.last_status),
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the standard builtins writing to the process's own streams.
    fn default() -> Self {
        Self::new(BuiltinRegistry::default(), Box::new(ProcessTerminal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PathAliases;
    use crate::io_adapters::MemTerminal;
    use std::collections::HashMap;
    use std::fs;

    fn interpreter_in(dir: &Path) -> (Interpreter, MemTerminal) {
        let term = MemTerminal::new();
        let env = Environment {
            vars: HashMap::from([("PATH".to_string(), "/usr/bin:/bin".to_string())]),
            current_dir: dir.to_path_buf(),
            aliases: PathAliases::with_home(Some(dir.to_string_lossy().into_owned())),
            should_exit: None,
        };
        let sh = Interpreter::with_env(env, BuiltinRegistry::default(), Box::new(term.clone()));
        (sh, term)
    }

    #[test]
    fn test_chain_runs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.execute_line("echo a && echo b && echo c").unwrap(), 0);
        assert_eq!(term.out.contents(), "a\nb\nc\n");
    }

    #[test]
    fn test_not_found_stops_chain() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        let err = sh
            .execute_line("nonexistent_cmd_xyz && echo never && echo again")
            .unwrap_err();
        assert!(matches!(err, ShellError::NotFound(ref name) if name == "nonexistent_cmd_xyz"));
        assert_eq!(term.out.contents(), "");
    }

    #[test]
    fn test_failure_in_middle_stops_rest() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        let status = sh.eval("echo first && type && echo never");
        assert_eq!(status, 1);
        assert_eq!(term.out.contents(), "first\n");
        assert!(term.err.contents().contains("type: expected 1 argument(s), received 0"));
    }

    #[test]
    fn test_eval_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.eval("nonexistent_xyz arg"), 127);
        assert_eq!(term.err.contents(), "nonexistent_xyz: command not found\n");
        assert_eq!(sh.last_status(), 127);
    }

    #[test]
    fn test_empty_line_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.execute_line("   ").unwrap(), 0);
        assert_eq!(term.out.contents(), "");
        assert_eq!(term.err.contents(), "");
    }

    #[test]
    fn test_echo_redirect_creates_file_and_leaves_terminal_clean() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.execute_line("echo hello > x/out.txt").unwrap(), 0);
        assert_eq!(
            fs::read_to_string(dir.path().join("x").join("out.txt")).unwrap(),
            "hello\n"
        );
        assert_eq!(term.out.contents(), "");
    }

    #[test]
    fn test_redirect_applies_per_command_in_chain() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        sh.execute_line("echo one 1> one.txt && echo two").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("one.txt")).unwrap(), "one\n");
        assert_eq!(term.out.contents(), "two\n");
    }

    #[test]
    fn test_exit_stops_chain_and_requests_exit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        sh.execute_line("echo a && exit 3 && echo b").unwrap();
        assert_eq!(sh.exit_requested(), Some(3));
        assert_eq!(term.out.contents(), "a\n");
    }

    #[test]
    fn test_bad_exit_does_not_terminate() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.eval("exit abc"), 1);
        assert_eq!(sh.eval("exit 1 2"), 1);
        assert_eq!(sh.exit_requested(), None);
        let errors = term.err.contents();
        assert!(errors.contains("exit: abc: numeric argument required"));
        assert!(errors.contains("exit: expected 0 or 1 argument(s), received 2"));
    }

    #[test]
    fn test_builtin_error_goes_to_redirected_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.eval("exit abc 2> err.txt"), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("err.txt")).unwrap(),
            "exit: abc: numeric argument required\n"
        );
        assert_eq!(term.err.contents(), "");
        assert_eq!(sh.exit_requested(), None);

        assert_eq!(sh.eval("type 2> logs/type.txt && echo never"), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("logs").join("type.txt")).unwrap(),
            "type: expected 1 argument(s), received 0\n"
        );
        assert_eq!(term.err.contents(), "");
        assert_eq!(term.out.contents(), "");
    }

    #[test]
    fn test_successful_builtin_leaves_stderr_file_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.eval("echo fine 2> err.txt"), 0);
        assert_eq!(fs::read_to_string(dir.path().join("err.txt")).unwrap(), "");
        assert_eq!(term.out.contents(), "fine\n");
    }

    #[test]
    fn test_uncreatable_redirect_target_stops_chain() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blocker"), "not a directory").unwrap();
        let (mut sh, term) = interpreter_in(dir.path());

        let status = sh.eval("echo a > blocker/out.txt && echo never");
        assert_eq!(status, 1);
        assert_eq!(term.out.contents(), "");
        let errors = term.err.contents();
        assert!(errors.contains("cannot create directory"), "got {errors:?}");
        assert!(errors.contains("blocker"), "got {errors:?}");
    }

    #[test]
    fn test_type_through_dispatcher() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        sh.execute_line("type echo && type nonexistent_xyz").unwrap();
        assert_eq!(
            term.out.contents(),
            "echo is a shell builtin\nnonexistent_xyz: not found\n"
        );
    }

    #[test]
    fn test_run_single_command() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.run("echo", &["x", "y"]).unwrap(), 0);
        assert_eq!(term.out.contents(), "x y\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_external_output_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, _term) = interpreter_in(dir.path());
        sh.execute_line("sh -c 'echo from child' > child.txt").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("child.txt")).unwrap(),
            "from child\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_external_stderr_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, _term) = interpreter_in(dir.path());
        sh.execute_line("sh -c 'echo oops 1>&2' 2> logs/err.txt").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("logs").join("err.txt")).unwrap(),
            "oops\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_external_failure_stops_chain() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        let err = sh.execute_line("sh -c 'exit 3' && echo never").unwrap_err();
        assert!(matches!(err, ShellError::ExternalFailure { code: 3, .. }));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(term.out.contents(), "");
    }

    #[test]
    #[cfg(unix)]
    fn test_external_success_continues_chain() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, term) = interpreter_in(dir.path());
        assert_eq!(sh.execute_line("true && echo yes").unwrap(), 0);
        assert_eq!(term.out.contents(), "yes\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_external_runs_in_shell_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sh, _term) = interpreter_in(dir.path());
        sh.execute_line("sh -c 'echo here > marker.txt'").unwrap();
        assert!(dir.path().join("marker.txt").exists());
    }
}
