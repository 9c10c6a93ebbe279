use std::path::PathBuf;

/// Everything a run needs to know, independent of how it was asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Gene-model file; standard input when `None`.
    pub gff: Option<PathBuf>,
    /// Protein interval table; listing mode when `None`.
    pub intervals: Option<PathBuf>,
    /// Interval table column delimiter; whitespace runs when `None`.
    pub delimiter: Option<String>,
}

impl Config {
    pub fn listing_only(&self) -> bool {
        self.intervals.is_none()
    }
}
