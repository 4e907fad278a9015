use std::ffi::CString;
use std::fs::File;
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::process::ExitStatus;

use log::{debug, info, warn};
use nix::{
    errno::Errno,
    libc,
    sys::wait::{self, WaitPidFlag, WaitStatus},
    unistd::{self, ForkResult, Pid},
};

use crate::{
    builtins,
    core::{
        job::{Job, ProcessId},
        parser::{Command, ExecutionMode},
    },
    errors::{Error, ErrorKind, Result, ResultExt},
    shell::Shell,
    util::SsiExitStatusExt,
};

/// Exit status of a child whose program could not be executed.
pub const COMMAND_NOT_FOUND_EXIT_STATUS: i32 = 127;

/// Runs `command`, either as a builtin or as a new process.
///
/// Foreground processes are waited for. A background launch returns the
/// `Job` to register, which now owns `command`.
pub fn run(shell: &mut dyn Shell, command: Command, stdout: &mut dyn Write) -> Result<Option<Job>> {
    if builtins::dispatch(shell, &command, stdout) {
        return Ok(None);
    }

    let pid = spawn(&command)?;
    match command.mode() {
        ExecutionMode::Foreground => {
            let exit_status = wait_for_foreground(pid)?;
            if exit_status.code() == Some(COMMAND_NOT_FOUND_EXIT_STATUS) {
                info!("{}: exited with command-not-found status", command.program());
            }
            shell.set_last_exit_status(exit_status);
            Ok(None)
        }
        ExecutionMode::Background => {
            // Opportunistic; the next notification catches anything missed.
            if let Some(reaped) = try_reap()? {
                shell
                    .job_manager_mut()
                    .record_terminated(reaped, stdout)?;
            }
            shell.set_last_exit_status(ExitStatus::from_success());
            Ok(Some(Job::new(pid, command)))
        }
    }
}

/// Forks a child that executes `command`, returning its pid.
///
/// The child never returns from here: it either becomes the target program
/// or exits with `COMMAND_NOT_FOUND_EXIT_STATUS`.
#[allow(unsafe_code)]
pub fn spawn(command: &Command) -> Result<ProcessId> {
    // Everything the child touches is prepared before forking.
    let argv = to_cstrings(command.argv())?;
    let not_found = ErrorKind::CommandNotFound(command.program().to_string()).to_string();
    let stdin = if command.is_background() {
        Some(File::open("/dev/null")?)
    } else {
        None
    };

    // Unflushed output would be duplicated into the child.
    io::stdout().flush()?;

    // The shell is single-threaded, and the child only execs or exits.
    match unsafe { unistd::fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!("spawned {} as {}", command, child);
            Ok(child.into())
        }
        Ok(ForkResult::Child) => exec_or_die(&argv, stdin.as_ref(), &not_found),
        Err(e) => Err(e).chain_err(|| ErrorKind::ForkFailed(command.program().to_string())),
    }
}

/// Runs in the child only. Background children read from `/dev/null`
/// instead of the terminal.
fn exec_or_die(argv: &[CString], stdin: Option<&File>, not_found: &str) -> ! {
    if let Some(stdin) = stdin {
        if let Err(e) = unistd::dup2(stdin.as_raw_fd(), libc::STDIN_FILENO) {
            eprintln!("ssi: unable to detach stdin: {}", e);
        }
    }

    if let Some(program) = argv.first() {
        // execvp only returns on failure
        let _ = unistd::execvp(program, argv);
    }

    eprintln!("{}", not_found);
    // Skips the exit-time cleanup that belongs to the parent.
    #[allow(unsafe_code)]
    unsafe {
        libc::_exit(COMMAND_NOT_FOUND_EXIT_STATUS);
    }
}

fn to_cstrings(argv: &[String]) -> Result<Vec<CString>> {
    argv.iter()
        .map(|arg| {
            CString::new(arg.as_bytes())
                .map_err(|_| Error::from(ErrorKind::InvalidArgument(arg.to_string())))
        })
        .collect()
}

/// Blocks until the foreground child `pid` terminates.
pub fn wait_for_foreground(pid: ProcessId) -> Result<ExitStatus> {
    loop {
        match wait::waitpid(Pid::from(pid), None) {
            Ok(wait_status) => {
                debug!("foreground child: {:?}", wait_status);
                if let Some(exit_status) = ExitStatus::from_wait_status(wait_status) {
                    return Ok(exit_status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Collects at most one terminated child without blocking.
pub fn try_reap() -> Result<Option<ProcessId>> {
    let any_child = Pid::from_raw(-1);
    loop {
        match wait::waitpid(any_child, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return Ok(None),
            Ok(wait_status @ WaitStatus::Exited(..))
            | Ok(wait_status @ WaitStatus::Signaled(..)) => {
                debug!("reaped: {:?}", wait_status);
                return Ok(wait_status.pid().map(ProcessId::from));
            }
            Ok(wait_status) => {
                warn!("ignoring child state change: {:?}", wait_status);
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Reaps every child that has terminated so far, without blocking.
pub fn reap_terminated() -> Result<Vec<ProcessId>> {
    let mut reaped = Vec::new();
    while let Some(pid) = try_reap()? {
        reaped.push(pid);
    }

    Ok(reaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ErrorKind,
        shell::{unix::UnixShell, ShellConfig},
        test_util,
    };

    fn shell() -> UnixShell {
        UnixShell::with_home_dir(ShellConfig::noninteractive(), std::env::temp_dir()).unwrap()
    }

    #[test]
    fn test_to_cstrings_rejects_nul() {
        let err = to_cstrings(&["echo".to_string(), "a\0b".to_string()]).unwrap_err();
        match *err.kind() {
            ErrorKind::InvalidArgument(ref arg) => assert_eq!(arg, "a\0b"),
            ref kind => panic!("unexpected error kind: {:?}", kind),
        }
    }

    #[test]
    fn test_run_foreground_records_exit_status() {
        let _lock = test_util::lock_process();
        let mut shell = shell();
        let mut stdout = Vec::new();

        let command = Command::new("false", &[] as &[&str], ExecutionMode::Foreground);
        assert!(run(&mut shell, command, &mut stdout).unwrap().is_none());
        assert_eq!(shell.last_exit_status().code(), Some(1));

        let command = Command::new("true", &[] as &[&str], ExecutionMode::Foreground);
        assert!(run(&mut shell, command, &mut stdout).unwrap().is_none());
        assert!(shell.last_exit_status().success());
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_run_missing_program_exits_127() {
        let _lock = test_util::lock_process();
        let mut shell = shell();

        let command = Command::new(
            "ssi-test-no-such-program",
            &[] as &[&str],
            ExecutionMode::Foreground,
        );
        assert!(run(&mut shell, command, &mut Vec::new()).unwrap().is_none());
        assert_eq!(
            shell.last_exit_status().code(),
            Some(COMMAND_NOT_FOUND_EXIT_STATUS)
        );
    }

    #[test]
    fn test_run_background_returns_job() {
        let _lock = test_util::lock_process();
        let mut shell = shell();

        let command = Command::new("sleep", &["0"], ExecutionMode::Background);
        let job = run(&mut shell, command.clone(), &mut Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(job.command(), &command);

        // the launch may already have reaped the child; either way it is gone
        let _ = wait::waitpid(Pid::from(job.id()), None);
        assert!(try_reap().unwrap().is_none());
    }

    #[test]
    fn test_run_builtin_does_not_spawn() {
        let _lock = test_util::lock_process();
        let mut shell = shell();
        let mut stdout = Vec::new();

        let command = Command::new("bglist", &[] as &[&str], ExecutionMode::Background);
        assert!(run(&mut shell, command, &mut stdout).unwrap().is_none());
        assert_eq!(
            String::from_utf8(stdout).unwrap(),
            "Total Background Jobs:\t0\n"
        );
    }

    #[test]
    fn test_reap_terminated_collects_exited_children() {
        let _lock = test_util::lock_process();

        let first = spawn(&Command::new("true", &[] as &[&str], ExecutionMode::Background)).unwrap();
        let second = spawn(&Command::new("true", &[] as &[&str], ExecutionMode::Background)).unwrap();

        let mut reaped = Vec::new();
        for _ in 0..100 {
            reaped.extend(reap_terminated().unwrap());
            if reaped.len() == 2 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        assert!(reaped.contains(&first));
        assert!(reaped.contains(&second));
    }
}
