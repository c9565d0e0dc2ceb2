use std::process::ExitCode;

use crate::args::GlobalArgs;

/// Outcome of a command: an exit status plus an optional closing message.
#[derive(Debug)]
pub struct Exit {
    code: ExitCode,
    message: Option<String>,
}

impl Exit {
    pub fn success() -> Self {
        Self {
            code: ExitCode::SUCCESS,
            message: None,
        }
    }

    pub fn error() -> Self {
        Self {
            code: ExitCode::FAILURE,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Print the closing message to stderr unless `--quiet` was given.
    pub fn report(self, args: &GlobalArgs) -> ExitCode {
        if let Some(message) = self.message {
            if !args.quiet {
                eprintln!("{message}");
            }
        }
        self.code
    }
}
