use crate::builtins::{self, prelude::*};

/// Lists background jobs. Answers to both `bglist` and `jobs`; arguments are
/// ignored.
pub struct Jobs;

impl builtins::BuiltinCommand for Jobs {
    const NAME: &'static str = builtins::BGLIST_NAME;

    fn run<T: AsRef<str>>(shell: &mut dyn Shell, _args: &[T], stdout: &mut dyn Write) -> Result<()> {
        shell.job_manager().list(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::BuiltinCommand;
    use crate::core::{
        job::{Job, ProcessId},
        parser::{Command, ExecutionMode},
    };
    use crate::shell::{unix::UnixShell, ShellConfig};

    #[test]
    fn test_bglist_output() {
        let mut shell =
            UnixShell::with_home_dir(ShellConfig::noninteractive(), std::env::temp_dir()).unwrap();
        for (pid, seconds) in &[(31, "1"), (32, "2")] {
            let command = Command::new("sleep", &[seconds], ExecutionMode::Background);
            shell
                .job_manager_mut()
                .add(Job::new(ProcessId::from(*pid), command), &mut Vec::new())
                .unwrap();
        }

        let mut first = Vec::new();
        Jobs::run(&mut shell, &[] as &[&str], &mut first).unwrap();
        assert_eq!(
            String::from_utf8(first.clone()).unwrap(),
            "32: sleep 2\n31: sleep 1\nTotal Background Jobs:\t2\n"
        );

        let mut second = Vec::new();
        Jobs::run(&mut shell, &["ignored"], &mut second).unwrap();
        assert_eq!(first, second);
    }
}
