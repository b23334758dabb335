use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LoadError {
    /// Source file missing or unreadable. Fatal to the requested pass;
    /// never silently replaced by stale or empty data.
    SourceUnavailable { path: PathBuf, source: std::io::Error },
    /// Workbook opened but could not be read (bad format, missing sheet).
    Workbook { path: PathBuf, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable { path, source } => {
                write!(f, "source unavailable: {}: {source}", path.display())
            }
            Self::Workbook { path, message } => {
                write!(f, "cannot read workbook {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceUnavailable { source, .. } => Some(source),
            Self::Workbook { .. } => None,
        }
    }
}
