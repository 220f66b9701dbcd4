use std::path::PathBuf;
use std::process::ExitStatus;

/// Reasons a source could not be read.
///
/// These never reach callers of the attribute accessors: the resolver logs
/// them and treats the source as empty.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("cannot list {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(path.display().to_string())
        } else {
            SourceError::Io { path, source }
        }
    }
}
