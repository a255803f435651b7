use std::fmt;
use std::path::PathBuf;

use ringscan_recon::ReconError;

#[derive(Debug)]
pub enum IoError {
    /// Filesystem error on a specific path.
    Io { path: PathBuf, source: std::io::Error },
    /// The input could not be turned into a library.
    Recon(ReconError),
    /// CSV writer error.
    Csv(String),
    /// Manifest serialization error.
    Json(String),
    /// The charge output directory exists and the policy forbids reuse.
    DirectoryExists(PathBuf),
}

impl IoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Recon(e) => write!(f, "{e}"),
            Self::Csv(msg) => write!(f, "CSV write error: {msg}"),
            Self::Json(msg) => write!(f, "manifest error: {msg}"),
            Self::DirectoryExists(path) => {
                write!(f, "output directory {} already exists", path.display())
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Recon(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReconError> for IoError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}
