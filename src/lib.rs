//! SSI - Simple Shell Interpreter
//!
//! Runs commands in the foreground or background and keeps track of
//! background children until they terminate.

#![deny(unsafe_code)]
#![warn(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces
)]

#[macro_use]
extern crate error_chain;

/// Logs the error of a failed `Result` and carries on.
macro_rules! log_if_err {
    ($result:expr, $fmt:expr) => {{
        if let Err(e) = $result {
            ::log::error!("{}: {}", $fmt, e);
        }
    }};
    ($result:expr, $fmt:expr, $($arg:tt)*) => {{
        if let Err(e) = $result {
            ::log::error!("{}: {}", format_args!($fmt, $($arg)*), e);
        }
    }};
}

pub mod builtins;
pub mod core;
pub mod editor;
pub mod errors;
pub mod execute_command;
pub mod shell;
pub mod util;

pub use crate::shell::{create_shell, Shell, ShellConfig};
pub use crate::util::SsiExitStatusExt;
