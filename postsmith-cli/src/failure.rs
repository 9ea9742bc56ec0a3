use std::fmt::Display;

use colored::Colorize;
use sysexits::ExitCode;

/// A command that could not complete, with the exit code to report it under.
#[derive(Debug)]
pub struct Failure {
    pub code: ExitCode,
    pub message: String,
}

impl Failure {
    pub fn new(code: ExitCode, message: impl Display) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    /// The input was rejected before anything was stored or sent.
    pub fn usage(message: impl Display) -> Self {
        Self::new(ExitCode::Usage, message)
    }

    pub fn report(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.message);
    }
}

impl From<postsmith_lib::Error> for Failure {
    fn from(err: postsmith_lib::Error) -> Self {
        use postsmith_lib::Error::*;

        let code = match &err {
            NotFound(_) => ExitCode::NoInput,
            EmptyName | NameConflict { .. } | UnsupportedProvider(_) => ExitCode::DataErr,
            Io(_) | Persist(_) | Walk { .. } => ExitCode::IoErr,
            Json(_) | TomlSer(_) => ExitCode::Config,
            NoHomeDir => ExitCode::OsErr,
        };

        Self::new(code, err)
    }
}

pub type Outcome = Result<(), Failure>;
