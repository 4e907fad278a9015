use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::ExitStatus;

use nix::{libc, sys::wait::WaitStatus};

use crate::errors::{ErrorKind, Result};

/// Room for `"SSI: "`, a path of up to `PATH_MAX` bytes, `" > "` and a nul.
pub const PROMPT_CAPACITY: usize = 5 + libc::PATH_MAX as usize + 3 + 1;

/// Formats the prompt shown before each input line.
///
/// Fails with `PromptOverflow` if the prompt would not fit in
/// `PROMPT_CAPACITY` (the trailing nul included).
pub fn cwd_prompt(cwd: &Path) -> Result<String> {
    let prompt = format!("SSI: {} > ", cwd.display());
    if prompt.len() >= PROMPT_CAPACITY {
        return Err(ErrorKind::PromptOverflow(PROMPT_CAPACITY).into());
    }

    Ok(prompt)
}

/// SSI Utility Extensions for `ExitStatus`
pub trait SsiExitStatusExt {
    /// Create an ExitStatus to indicate *successful* program execution.
    fn from_success() -> Self;

    /// Create an ExitStatus to indicate *unsuccessful* program execution.
    fn from_failure() -> Self;

    /// Create an ExitStatus from a status code
    fn from_status(code: i32) -> Self;

    /// Create an ExitStatus from the result of `waitpid`, if the process has
    /// terminated. A process killed by a signal reports `128 + signal`.
    fn from_wait_status(wait_status: WaitStatus) -> Option<Self>
    where
        Self: Sized;
}

impl SsiExitStatusExt for ExitStatus {
    /// # Examples
    /// ```rust
    /// use ssi::SsiExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(ExitStatus::from_success().success());
    /// ```
    fn from_success() -> Self {
        ExitStatus::from_status(0)
    }

    /// # Examples
    /// ```rust
    /// use ssi::SsiExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(!ExitStatus::from_failure().success());
    /// ```
    fn from_failure() -> Self {
        ExitStatus::from_status(1)
    }

    fn from_status(code: i32) -> Self {
        ExitStatus::from_raw(code << 8)
    }

    fn from_wait_status(wait_status: WaitStatus) -> Option<Self> {
        match wait_status {
            WaitStatus::Exited(_, code) => Some(ExitStatus::from_status(code)),
            WaitStatus::Signaled(_, signal, _) => {
                Some(ExitStatus::from_status(128 + signal as i32))
            }
            _ => None,
        }
    }
}
