use crate::command::{ExitCode, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use log::debug;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// A program found on disk, ready to be spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    name: String,
    path: PathBuf,
}

impl ExternalCommand {
    /// Resolve `name` against the environment's search path.
    ///
    /// Returns `None` when no executable matches, which the caller reports as
    /// "command not found".
    pub fn locate(env: &Environment, name: &str) -> Option<Self> {
        let path = locate_path(env, name)?;
        Some(Self {
            name: name.to_string(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Spawn the program and block until it exits.
    ///
    /// The child sees the shell's variables and working directory, inherits
    /// stdin, and writes to whatever `stdout`/`stderr` were resolved to.
    /// `argv[0]` is the name the user typed, not the resolved path.
    pub fn execute(
        self,
        args: &[String],
        stdout: Box<dyn Stdout>,
        stderr: Box<dyn Stdout>,
        env: &Environment,
    ) -> Result<ExitCode, ShellError> {
        debug!("spawning {} {:?}", self.path.display(), args);
        let mut cmd = std::process::Command::new(&self.path);
        set_arg0(&mut cmd, &self.name);
        let mut child = cmd
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(stdout.stdio())
            .stderr(stderr.stdio())
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn()
            .map_err(|e| ShellError::io(format!("{}: cannot run", self.name), e))?;
        let exit_status = child
            .wait()
            .map_err(|e| ShellError::io(format!("{}: wait failed", self.name), e))?;
        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        debug!("{} exited with {}", self.name, code);
        Ok(code)
    }
}

/// Find the executable `name` refers to, as seen from the shell's environment.
///
/// Names with a directory part (`./tool`, `bin/x`) are taken relative to the
/// environment's current directory, not the process's.
pub(crate) fn locate_path(env: &Environment, name: &str) -> Option<PathBuf> {
    let search_paths = env.search_path().unwrap_or_default();
    let raw = Path::new(name);
    let anchored;
    let candidate = if raw.components().nth(1).is_some() {
        anchored = env.resolve_path(name);
        anchored.as_path()
    } else {
        raw
    };
    find_command_path(OsStr::new(&search_paths), candidate).map(|p| p.into_owned())
}

#[cfg(unix)]
fn set_arg0(cmd: &mut std::process::Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut std::process::Command, _name: &str) {}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Relative with multiple components (e.g., `bin/sh` or `./foo`): returns it if it is
///   an executable file, relative to the process working directory.
/// - Single path component (no separators): search each directory in `search_paths`
///   (PATH) in order and return the first executable match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        // Empty path -> not found
        (None, None) => None,
        // Single component -> search in PATH
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        // Multiple components -> relative to the current dir
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        // An empty entry stands for the current directory.
        let dir = if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir
        };
        let path = dir.join(cmd);
        if find_by_path(&path).is_some() {
            return Some(path);
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable(path) { Some(path) } else { None }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use std::fs::File;

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, "#!/bin/sh\nexit 0\n").expect("write script");
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let res = find_command_path(OsStr::new("/bin"), path);
        assert!(res.is_some(), "Expected to find /bin/sh via absolute path");
        assert_eq!(res.unwrap().as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let path = Path::new("/bin/nonexisting");
        let res = find_command_path(OsStr::new("/bin"), path);
        assert!(res.is_none(), "Expected not to find /bin/nonexisting");
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let res = find_command_path(OsStr::new("/bin"), Path::new("sh"));
        let found = res.expect("Expected to find 'sh' in /bin via PATH search");
        assert_eq!(found.as_ref(), Path::new("/bin/sh"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let res = find_command_path(OsStr::new("/bin"), Path::new("nonexisting_xyz"));
        assert!(res.is_none(), "Expected not to find 'nonexisting_xyz' in PATH");
    }

    #[test]
    #[cfg(unix)]
    fn search_path_is_checked_in_order() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        make_executable(&first.path().join("tool"));
        make_executable(&second.path().join("tool"));

        let search: OsString =
            std::env::join_paths([second.path(), first.path()]).expect("join paths");
        let found = find_command_path(&search, Path::new("tool")).expect("tool in PATH");
        assert_eq!(found.as_ref(), second.path().join("tool"));
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_files_are_skipped() {
        let plain = tempfile::tempdir().expect("tempdir");
        let bin = tempfile::tempdir().expect("tempdir");
        File::create(plain.path().join("tool")).expect("touch");
        make_executable(&bin.path().join("tool"));

        let search = std::env::join_paths([plain.path(), bin.path()]).expect("join paths");
        let found = find_command_path(&search, Path::new("tool")).expect("tool in PATH");
        assert_eq!(found.as_ref(), bin.path().join("tool"));
    }

    #[test]
    #[cfg(unix)]
    fn directories_are_not_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("tool")).expect("mkdir");
        let res = find_command_path(dir.path().as_os_str(), Path::new("tool"));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn explicit_script_path_skips_search() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("bin")).expect("create bin dir");
        let script = dir.path().join("bin").join("run");
        make_executable(&script);

        let res = find_command_path(OsStr::new("/does/not/matter"), &script);
        assert_eq!(res.expect("direct path").as_ref(), script.as_path());
    }

    #[cfg(unix)]
    fn env_in(dir: &Path) -> Environment {
        Environment {
            vars: std::collections::HashMap::from([(
                "PATH".to_string(),
                "/nonexistent_dir".to_string(),
            )]),
            current_dir: dir.to_path_buf(),
            aliases: crate::env::PathAliases::default(),
            should_exit: None,
        }
    }

    #[test]
    #[cfg(unix)]
    fn relative_path_is_anchored_at_shell_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("bin")).expect("create bin dir");
        make_executable(&dir.path().join("tool"));
        make_executable(&dir.path().join("bin").join("x"));

        let env = env_in(dir.path());
        let tool = ExternalCommand::locate(&env, "./tool").expect("./tool");
        assert_eq!(tool.path(), dir.path().join("./tool"));
        let nested = ExternalCommand::locate(&env, "bin/x").expect("bin/x");
        assert_eq!(nested.path(), dir.path().join("bin").join("x"));
    }

    #[test]
    #[cfg(unix)]
    fn bare_name_ignores_shell_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        make_executable(&dir.path().join("tool"));
        assert!(ExternalCommand::locate(&env_in(dir.path()), "tool").is_none());
    }

    #[test]
    fn empty_path_is_none() {
        let res = find_command_path(OsStr::new("/bin"), Path::new(""));
        assert!(res.is_none(), "Empty path should not resolve to anything");
    }
}
