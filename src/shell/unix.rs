//! The UnixShell runs commands in the foreground and background and reports
//! on background jobs as they terminate.

use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{self, ExitStatus};

use log::{debug, error, info};

use super::{JobManager, Shell, ShellConfig, SYNTAX_ERROR_EXIT_STATUS};
use crate::{
    core::parser::Command,
    editor::Editor,
    errors::{ErrorKind, Result},
    execute_command,
    util::{self, SsiExitStatusExt},
};

pub struct UnixShell {
    /// Responsible for readline and history.
    editor: Editor,
    home_dir: PathBuf,
    job_manager: JobManager,
    /// Exit status of last command executed.
    last_exit_status: ExitStatus,
    config: ShellConfig,
}

impl UnixShell {
    /// Constructs a new UnixShell, taking the home directory from `$HOME`.
    pub fn new(config: ShellConfig) -> Result<Self> {
        let home_dir = env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .ok_or(ErrorKind::HomeNotSet)?;
        Self::with_home_dir(config, home_dir)
    }

    pub fn with_home_dir(config: ShellConfig, home_dir: PathBuf) -> Result<Self> {
        let editor = if config.line_editing {
            Editor::with_capacity(config.command_history_capacity)?
        } else {
            Editor::from_stdin()
        };

        let shell = Self {
            editor,
            home_dir,
            job_manager: Default::default(),
            last_exit_status: ExitStatus::from_success(),
            config,
        };

        info!("ssi started up with home {}", shell.home_dir.display());
        Ok(shell)
    }

    /// The prompt to show before reading a line; empty when prompts are not
    /// displayed.
    fn prompt(&self) -> Result<String> {
        if !self.config.display_messages {
            return Ok(String::new());
        }

        let cwd = env::current_dir()?;
        util::cwd_prompt(&cwd)
    }
}

impl Shell for UnixShell {
    fn execute_command_string(&mut self, input: &str) -> Result<()> {
        let command = match Command::parse(input) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(e) => {
                if let ErrorKind::MissingCommandArgument(_) = *e.kind() {
                    eprintln!("ssi: {}", e);
                    self.last_exit_status = ExitStatus::from_status(SYNTAX_ERROR_EXIT_STATUS);
                    return Ok(());
                }

                return Err(e);
            }
        };

        if self.is_interactive() {
            self.editor.add_history_entry(input);
        }

        let mut stdout = io::stdout();
        if let Some(job) = execute_command::run(self, command, &mut stdout)? {
            self.job_manager.add(job, &mut stdout)?;
        }

        Ok(())
    }

    fn execute_from_stdin(&mut self) {
        loop {
            // Report background jobs that terminated since the last prompt.
            let temp_result = self.job_manager.do_job_notification(&mut io::stdout());
            log_if_err!(temp_result, "do_job_notification");

            let prompt = match self.prompt() {
                Ok(prompt) => prompt,
                Err(e) => {
                    error!("failed to build prompt: {}", e);
                    eprintln!("ssi: {}", e);
                    self.exit(Some(ExitStatus::from_failure()));
                }
            };

            let input = match self.editor.readline(&prompt) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("failed to read line: {}", e);
                    eprintln!("ssi: {}", e);
                    break;
                }
            };

            debug!("input: {:?}", input);
            if let Err(e) = self.execute_command_string(&input) {
                error!("execute_command_string: {}", e);
                eprintln!("ssi: {}", e);
            }
        }
    }

    fn exit(&mut self, n: Option<ExitStatus>) -> ! {
        if self.config.display_messages {
            println!("exit");
        }

        let code = n
            .unwrap_or(self.last_exit_status)
            .code()
            .unwrap_or(SYNTAX_ERROR_EXIT_STATUS);

        // Running jobs are left alone; only their records go.
        self.job_manager.abandon();

        info!("ssi has shut down");
        process::exit(code);
    }

    fn is_interactive(&self) -> bool {
        self.config.line_editing
    }

    fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    fn last_exit_status(&self) -> ExitStatus {
        self.last_exit_status
    }

    fn set_last_exit_status(&mut self, exit_status: ExitStatus) {
        self.last_exit_status = exit_status;
    }

    fn job_manager(&self) -> &JobManager {
        &self.job_manager
    }

    fn job_manager_mut(&mut self) -> &mut JobManager {
        &mut self.job_manager
    }
}

impl fmt::Debug for UnixShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "home: {}\n{:?}\n{:?}",
            self.home_dir.display(),
            self.job_manager,
            self.editor
        )
    }
}

pub fn create_shell(config: ShellConfig) -> Result<Box<dyn Shell>> {
    let shell = UnixShell::new(config)?;
    Ok(Box::new(shell))
}
