use anyhow::Context;
use argh::FromArgs;
use log::debug;
use myshell::logging::{self, DEFAULT_LOG_FILE, LogOptions};
use myshell::{DEFAULT_PROMPT, Interpreter};
use std::path::PathBuf;

#[derive(FromArgs)]
/// A small interactive shell with `&&` chaining and output redirection.
struct Options {
    #[argh(option, short = 'c')]
    /// run this line instead of starting an interactive session
    command: Option<String>,

    #[argh(switch)]
    /// append debug logs to the log file
    debug: bool,

    #[argh(option, default = "PathBuf::from(DEFAULT_LOG_FILE)")]
    /// where --debug writes its log (default: debug.log)
    log_file: PathBuf,

    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt shown before each line
    prompt: String,
}

fn main() -> anyhow::Result<()> {
    let options: Options = argh::from_env();
    logging::init(&LogOptions {
        debug: options.debug,
        file: options.log_file.clone(),
    })?;

    let mut shell = Interpreter::default();
    let status = match &options.command {
        Some(line) => {
            debug!("one-shot: {line:?}");
            let status = shell.eval(line);
            shell.exit_requested().unwrap_or(status)
        }
        None => shell
            .repl(&options.prompt)
            .context("line editor failed")?,
    };
    std::process::exit(status)
}
