//! Error module. See the [error-chain](https://crates.io/crates/error-chain) crate for details.

#![allow(missing_docs)]

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Nix(::nix::Error);
        Readline(::rustyline::error::ReadlineError);
    }

    errors {
        MissingCommandArgument(command: String) {
            description("missing command argument")
            display("{}: missing command argument", command)
        }

        BuiltinCommand(message: String, code: i32) {
            description("builtin command failed")
            display("{}", message)
        }

        CommandNotFound(command: String) {
            description("command not found")
            display("{}: not found", command)
        }

        HomeNotSet {
            description("HOME environment variable not set")
            display("HOME environment variable not set")
        }

        PromptOverflow(limit: usize) {
            description("prompt too long")
            display("prompt exceeds {} bytes", limit)
        }

        ForkFailed(command: String) {
            description("fork failed")
            display("{}: fork failed", command)
        }

        InvalidArgument(arg: String) {
            description("invalid argument")
            display("{:?}: argument contains a nul byte", arg)
        }
    }
}

impl Error {
    pub(crate) fn builtin_command<T: AsRef<str>>(message: T, code: i32) -> Error {
        Error::from(ErrorKind::BuiltinCommand(message.as_ref().to_string(), code))
    }

    pub(crate) fn missing_command_argument<T: AsRef<str>>(command: T) -> Error {
        Error::from(ErrorKind::MissingCommandArgument(command.as_ref().to_string()))
    }
}
