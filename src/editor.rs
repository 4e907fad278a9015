//! Line reading for the shell's prompt loop.
//!
//! Interactive shells read through `rustyline`, which also keeps the recall
//! history. Otherwise lines come straight from standard input.

use std::fmt;
use std::io::{self, BufRead};

use log::debug;
use rustyline::{
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    CompletionType, Config, Helper,
};

use crate::errors::Result;

struct EditorHelper(FilenameCompleter);

impl Completer for EditorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.0.complete(line, pos, ctx)
    }
}

impl Hinter for EditorHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for EditorHelper {}

impl Helper for EditorHelper {}

impl Validator for EditorHelper {}

enum Backend {
    Readline(rustyline::Editor<EditorHelper, DefaultHistory>),
    Stdin,
}

pub struct Editor {
    backend: Backend,
}

impl Editor {
    /// An editor with line editing, filename completion and a recall history
    /// of at most `history_capacity` entries.
    pub fn with_capacity(history_capacity: usize) -> Result<Editor> {
        let config = Config::builder()
            .max_history_size(history_capacity)?
            .history_ignore_space(true)
            .auto_add_history(false)
            .completion_type(CompletionType::Circular)
            .build();

        let mut internal: rustyline::Editor<EditorHelper, DefaultHistory> =
            rustyline::Editor::with_config(config)?;
        internal.set_helper(Some(EditorHelper(FilenameCompleter::new())));

        Ok(Editor {
            backend: Backend::Readline(internal),
        })
    }

    /// An editor reading plain lines from standard input, with no prompt and
    /// no history.
    pub fn from_stdin() -> Editor {
        Editor {
            backend: Backend::Stdin,
        }
    }

    /// Returns `None` when end of input is reached. An interrupt at the
    /// prompt gives back an empty line.
    pub fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.backend {
            Backend::Readline(ref mut internal) => match internal.readline(prompt) {
                Ok(line) => Ok(Some(line)),
                Err(ReadlineError::Eof) => Ok(None),
                Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
                Err(e) => Err(e.into()),
            },
            Backend::Stdin => read_stdin_line(&mut io::stdin().lock()),
        }
    }

    pub fn add_history_entry(&mut self, line: &str) {
        if let Backend::Readline(ref mut internal) = self.backend {
            match internal.add_history_entry(line) {
                Ok(true) => {}
                Ok(false) => debug!("history entry skipped: {:?}", line),
                e => log_if_err!(e, "add_history_entry"),
            }
        }
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match self.backend {
            Backend::Readline(_) => "readline",
            Backend::Stdin => "stdin",
        };
        write!(f, "backend: {}", backend)
    }
}

/// Reads one line, replacing bytes that are not valid UTF-8.
fn read_stdin_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut bytes = Vec::new();
    if reader.read_until(b'\n', &mut bytes)? == 0 {
        return Ok(None);
    }

    while bytes.ends_with(b"\n") || bytes.ends_with(b"\r") {
        bytes.pop();
    }

    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}
