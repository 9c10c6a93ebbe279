use thiserror::Error as ThisError;

/// How far an error reaches: a `Warning` drops the gene block it was found in,
/// a `Fatal` error stops the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Fatal,
}

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub severity: Severity,
    pub message: String,
}

impl Error {
    pub fn warning(msg: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: msg.into() }
    }
    pub fn fatal(msg: impl Into<String>) -> Self {
        Self { severity: Severity::Fatal, message: msg.into() }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::fatal(format!("I/O error: {err}"))
    }
}
