use std::env;
use std::path::PathBuf;
use std::process::{self, ExitStatus};

use atty::Stream;
use docopt::Docopt;
use log::{debug, error};
use nix::unistd::Pid;
use serde::Deserialize;
use ssi::errors::Error;
use ssi::{create_shell, ShellConfig, SsiExitStatusExt};

const COMMAND_HISTORY_CAPACITY: usize = 10;
const LOG_FILE_NAME: &str = ".ssi_log";

const USAGE: &str = "
ssi.

Usage:
    ssi [options]
    ssi (-h | --help)
    ssi --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    --log=<path>    File to write log to, defaults to ~/.ssi_log
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    flag_version: bool,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if args.flag_version {
        println!("ssi version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = init_logger(&args.flag_log) {
        eprintln!("ssi: unable to start logging: {}", e);
    }
    debug!("{:?}", args);

    let shell_config = if atty::is(Stream::Stdin) {
        ShellConfig::interactive(COMMAND_HISTORY_CAPACITY)
    } else {
        ShellConfig::noninteractive()
    };

    let mut shell = create_shell(shell_config).unwrap_or_else(|e| display_error_and_exit(&e));
    shell.execute_from_stdin();
    shell.exit(Some(ExitStatus::from_success()))
}

fn init_logger(path: &Option<String>) -> Result<(), fern::InitError> {
    let log_path = match path.clone().map(PathBuf::from).or_else(default_log_path) {
        Some(log_path) => log_path,
        None => return Ok(()),
    };

    let pid = Pid::this();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(fern::log_file(log_path)?)
        .apply()?;
    Ok(())
}

fn default_log_path() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(LOG_FILE_NAME))
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("ssi: {}", error);
    process::exit(ExitStatus::from_failure().code().unwrap_or(1));
}
