//! Error types for the snippet pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a snippet task.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Reading, writing or removing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extraction pattern does not compile or lacks a body capture group.
    #[error("invalid snippet pattern: {0}")]
    InvalidPattern(String),

    /// Artifact names would escape the working directory or match files
    /// that are not artifacts.
    #[error("invalid artifact naming: {0}")]
    InvalidNaming(String),

    /// An external program could not be located or spawned.
    #[error("program not found: {program}")]
    ProgramNotFound { program: String },

    /// An external command exited unsuccessfully.
    #[error("Command failed with status ({}): [{command}]", status_label(.code))]
    CommandFailed { command: String, code: Option<i32> },

    /// Progress output could not be written.
    #[error("writing progress output: {0}")]
    Progress(#[source] std::io::Error),

    /// No task is registered under the requested name.
    #[error("Don't know how to build task '{name}' (known tasks: {})", .available.join(", "))]
    UnknownTask {
        name: String,
        available: Vec<String>,
    },
}

impl RunnerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunnerError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code a command-line front end should terminate with.
    ///
    /// A failed external command propagates its own exit code; a command
    /// killed by a signal, and every other error, maps to `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn status_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// Result type for snippet operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
