use std::fmt;

use nix::{libc, unistd::Pid};

use crate::core::parser::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcessId(libc::pid_t);

impl ProcessId {
    pub fn as_raw(self) -> libc::pid_t {
        self.0
    }
}

impl From<libc::pid_t> for ProcessId {
    fn from(value: libc::pid_t) -> Self {
        ProcessId(value)
    }
}

impl From<Pid> for ProcessId {
    fn from(value: Pid) -> Self {
        ProcessId(value.as_raw())
    }
}

impl From<ProcessId> for Pid {
    fn from(value: ProcessId) -> Self {
        Pid::from_raw(value.0)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A background process and the command that started it.
///
/// Only the job registry holds jobs; removing one hands it back to the caller.
#[derive(Debug, PartialEq)]
pub struct Job {
    id: ProcessId,
    command: Command,
}

impl Job {
    pub fn new(id: ProcessId, command: Command) -> Self {
        Self { id, command }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.command)
    }
}
