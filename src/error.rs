use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed error returned by injected parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CollectError>;

#[derive(Error, Debug)]
pub enum CollectError {
    // Content
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    // Traversal
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("symlink loop at {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("walk error: {0}")]
    Walk(String),

    // Config
    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid config")]
    ConfigText(#[source] serde_yaml::Error),

    #[error("invalid config in {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    // Runtime
    #[error("thread pool failure: {0}")]
    ThreadPool(String),
}

impl CollectError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::Config { path, .. }
            | Self::NotFound(path)
            | Self::SymlinkLoop(path) => Some(path),
            _ => None,
        }
    }

    /// Whether this error means a file or root path does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
