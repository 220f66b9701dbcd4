use std::process::{Command, Stdio};

use crate::error::SourceError;

/// Runs an external command and hands back its stdout, one entry per line.
///
/// The resolver only ever talks to `lsb_release` and `uname` through this
/// trait, so tests can substitute canned output.
pub trait CommandRunner {
    fn stdout_lines(&self, program: &str, args: &[&str]) -> Result<Vec<String>, SourceError>;
}

/// Invokes commands from `PATH`, discarding their stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn stdout_lines(&self, program: &str, args: &[&str]) -> Result<Vec<String>, SourceError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| SourceError::io(program, e))?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                status: output.status,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}
