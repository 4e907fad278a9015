use std::env;
use std::path::PathBuf;

use crate::builtins::{self, prelude::*};

const OLDPWD: &str = "OLDPWD";

pub struct Cd;

impl builtins::BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    fn run<T: AsRef<str>>(shell: &mut dyn Shell, args: &[T], stdout: &mut dyn Write) -> Result<()> {
        let (dir, print_dir) = match args {
            [] => (shell.home_dir().to_path_buf(), false),
            [arg] => match arg.as_ref() {
                "~" => (shell.home_dir().to_path_buf(), false),
                "-" => match env::var_os(OLDPWD) {
                    Some(oldpwd) => (PathBuf::from(oldpwd), true),
                    None => {
                        return Err(Error::builtin_command(
                            format!("{}: {} not set", Self::NAME, OLDPWD),
                            1,
                        ))
                    }
                },
                arg => (PathBuf::from(arg), false),
            },
            _ => {
                return Err(Error::builtin_command(
                    format!("{}: too many arguments", Self::NAME),
                    1,
                ))
            }
        };

        let previous_dir = env::current_dir();
        env::set_current_dir(&dir).map_err(|e| {
            Error::builtin_command(format!("{}: {}: {}", Self::NAME, dir.display(), e), 1)
        })?;

        match previous_dir {
            Ok(previous_dir) => env::set_var(OLDPWD, previous_dir),
            Err(e) => log::warn!("unable to record {}: {}", OLDPWD, e),
        }

        if print_dir {
            writeln!(stdout, "{}", env::current_dir()?.display())?;
        }

        Ok(())
    }
}
