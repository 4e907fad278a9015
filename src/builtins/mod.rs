//! SSI builtins
//!
//! Commands the shell runs in its own process, without forking: `cd`,
//! `bglist` (also `jobs`) and `exit`.

use log::{debug, error};

use self::prelude::*;
use crate::core::parser::Command;

use self::dirs::Cd;
use self::exit::Exit;
use self::jobs::Jobs;

pub mod prelude {
    pub use std::io::Write;
    pub use std::process::ExitStatus;

    pub use crate::errors::{Error, ErrorKind, Result};
    pub use crate::shell::Shell;
    pub use crate::util::SsiExitStatusExt;
}

mod dirs;
mod exit;
mod jobs;

const BGLIST_NAME: &str = "bglist";
const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const JOBS_NAME: &str = "jobs";

/// Represents an SSI builtin command such as cd or bglist.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run<T: AsRef<str>>(shell: &mut dyn Shell, args: &[T], stdout: &mut dyn Write)
        -> Result<()>;
}

pub fn is_builtin<T: AsRef<str>>(program: T) -> bool {
    builtin_name(program.as_ref()).is_some()
}

/// Maps `program` to the builtin it names. `exit` matches in any case.
fn builtin_name(program: &str) -> Option<&'static str> {
    if program.eq_ignore_ascii_case(EXIT_NAME) {
        return Some(EXIT_NAME);
    }

    [BGLIST_NAME, CD_NAME, JOBS_NAME]
        .iter()
        .find(|name| **name == program)
        .cloned()
}

/// precondition: command is a builtin.
/// Returns (`exit_status_code`, `builtin_result`)
pub fn run<S1, S2>(
    shell: &mut dyn Shell,
    program: S1,
    args: &[S2],
    stdout: &mut dyn Write,
) -> (ExitStatus, Result<()>)
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug_assert!(is_builtin(&program));

    let result = match builtin_name(program.as_ref()) {
        Some(BGLIST_NAME) | Some(JOBS_NAME) => Jobs::run(shell, args, stdout),
        Some(CD_NAME) => Cd::run(shell, args, stdout),
        Some(EXIT_NAME) => Exit::run(shell, args, stdout),
        _ => Err(Error::builtin_command(
            format!("{}: not a builtin", program.as_ref()),
            1,
        )),
    };

    let exit_status = get_builtin_exit_status(&result);
    (exit_status, result)
}

/// Runs `command` if it names a builtin, reporting any failure on standard
/// error. Returns `false` when the command is not a builtin.
pub fn dispatch(shell: &mut dyn Shell, command: &Command, stdout: &mut dyn Write) -> bool {
    if !is_builtin(command.program()) {
        return false;
    }

    debug!("running builtin: {}", command);
    let (exit_status, result) = run(shell, command.program(), command.args(), stdout);
    if let Err(e) = result {
        error!("builtin {} failed: {}", command.program(), e);
        eprintln!("ssi: {}", e);
    }

    shell.set_last_exit_status(exit_status);
    true
}

fn get_builtin_exit_status(result: &Result<()>) -> ExitStatus {
    let status = if let Err(ref e) = *result {
        match *e.kind() {
            ErrorKind::BuiltinCommand(_, code) => code,
            _ => 1,
        }
    } else {
        0
    };

    ExitStatus::from_status(status)
}
