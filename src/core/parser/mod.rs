//! SSI Parser
//!
//! Splits an input line into words and decides whether the resulting command
//! runs in the foreground or in the background. Words are separated by runs of
//! spaces and tabs; there is no quoting or escaping.

use std::fmt;
use std::iter;
use std::mem;

use log::debug;

use crate::errors::{Error, Result};

/// Leading word that sends the rest of the line to the background.
pub const BACKGROUND_KEYWORD: &str = "bg";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    Foreground,
    Background,
}

/// A program invocation built from one input line.
///
/// `argv` is never empty; its first element is the program as the launched
/// process sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    argv: Vec<String>,
    mode: ExecutionMode,
}

impl Command {
    pub fn new<S1, S2>(program: S1, args: &[S2], mode: ExecutionMode) -> Self
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        Self {
            argv: iter::once(program.as_ref().to_string())
                .chain(args.iter().map(|arg| arg.as_ref().to_string()))
                .collect(),
            mode,
        }
    }

    /// Parses one input line.
    ///
    /// Returns `Ok(None)` for an empty or all-whitespace line. A line holding
    /// only the background keyword is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ssi::core::parser::{Command, ExecutionMode};
    ///
    /// let command = Command::parse("bg sleep 5").unwrap().unwrap();
    /// assert_eq!(command.program(), "sleep");
    /// assert_eq!(command.argv(), ["sleep", "5"]);
    /// assert_eq!(command.mode(), ExecutionMode::Background);
    /// ```
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let mut words = tokenize(input);
        if words.is_empty() {
            return Ok(None);
        }

        let mode = if words[0] == BACKGROUND_KEYWORD {
            words.remove(0);
            if words.is_empty() {
                return Err(Error::missing_command_argument(BACKGROUND_KEYWORD));
            }
            ExecutionMode::Background
        } else {
            ExecutionMode::Foreground
        };

        let command = Self { argv: words, mode };
        debug!("parsed Command: {:?}", command);
        Ok(Some(command))
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments following the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn is_background(&self) -> bool {
        self.mode == ExecutionMode::Background
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum LexState {
    Delimiter,
    Token,
}

fn is_delimiter(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn tokenize(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut state = LexState::Delimiter;

    for c in input.chars() {
        match (state, is_delimiter(c)) {
            (LexState::Delimiter, true) => {}
            (LexState::Delimiter, false) => {
                word.push(c);
                state = LexState::Token;
            }
            (LexState::Token, false) => word.push(c),
            (LexState::Token, true) => {
                words.push(mem::take(&mut word));
                state = LexState::Delimiter;
            }
        }
    }

    if state == LexState::Token {
        words.push(word);
    }

    words
}
