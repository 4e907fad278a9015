use std::{path::Path, process::ExitStatus};

use crate::errors::Result;

pub use self::job_control::JobManager;
#[cfg(unix)]
pub use self::unix::create_shell;

pub mod job_control;
#[cfg(unix)]
pub mod unix;

const SYNTAX_ERROR_EXIT_STATUS: i32 = 2;

pub trait Shell {
    fn execute_command_string(&mut self, input: &str) -> Result<()>;
    fn execute_from_stdin(&mut self);
    fn exit(&mut self, n: Option<ExitStatus>) -> !;
    fn is_interactive(&self) -> bool;
    /// Directory `cd` goes to without an argument, fixed at startup.
    fn home_dir(&self) -> &Path;
    fn last_exit_status(&self) -> ExitStatus;
    fn set_last_exit_status(&mut self, exit_status: ExitStatus);
    fn job_manager(&self) -> &JobManager;
    fn job_manager_mut(&mut self) -> &mut JobManager;
}

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Determines if lines are read through the line editor, which keeps a
    /// recall history. Otherwise lines are read from stdin as they come.
    line_editing: bool,

    /// Number of entries to store in the shell's command history
    command_history_capacity: usize,

    /// Determines if the prompt and some messages (e.g. "exit") are displayed.
    display_messages: bool,
}

impl ShellConfig {
    /// Creates an interactive shell, e.g. line editing, command history
    ///
    /// # Complete List
    /// - Line editing and command history are enabled
    /// - The prompt is displayed
    /// - Some additional messages are displayed
    pub fn interactive(command_history_capacity: usize) -> Self {
        Self {
            line_editing: true,
            command_history_capacity,
            display_messages: true,
        }
    }

    /// Creates a noninteractive shell, e.g. reading commands piped to stdin
    ///
    /// # Complete List
    /// - Line editing and command history are disabled.
    /// - No prompt is displayed.
    /// - Fewer messages are displayed
    pub fn noninteractive() -> Self {
        Default::default()
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            line_editing: false,
            command_history_capacity: 0,
            display_messages: false,
        }
    }
}
