//! Harness error types.

use thiserror::Error;

/// Boxed backend error carried by adapter failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the harness.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], one per failing adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Open,
    Insert,
    Fetch,
    Size,
    Close,
    Reset,
    Config,
    Io,
}

/// Benchmark harness errors.
///
/// Every adapter failure aborts the whole run; nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend could not be opened for a table.
    #[error("{backend}: failed to open table '{table}': {source}")]
    Open {
        backend: String,
        table: String,
        #[source]
        source: BoxError,
    },

    /// Insert into a table failed.
    #[error("{backend}: insert into '{table}' failed: {source}")]
    Insert {
        backend: String,
        table: String,
        #[source]
        source: BoxError,
    },

    /// Fetch from a table failed.
    #[error("{backend}: fetch from '{table}' failed: {source}")]
    Fetch {
        backend: String,
        table: String,
        #[source]
        source: BoxError,
    },

    /// Counting the entries of a table failed.
    #[error("{backend}: size of '{table}' failed: {source}")]
    Size {
        backend: String,
        table: String,
        #[source]
        source: BoxError,
    },

    /// Releasing a table handle failed.
    #[error("{backend}: close of '{table}' failed: {source}")]
    Close {
        backend: String,
        table: String,
        #[source]
        source: BoxError,
    },

    /// Wiping the backend's physical store failed.
    #[error("{backend}: reset failed: {source}")]
    Reset {
        backend: String,
        #[source]
        source: BoxError,
    },

    /// The fetch phase found nothing to sample.
    #[error("{backend}: table '{table}' has no keys to sample")]
    EmptyKeyIndex { backend: String, table: String },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Open { .. } => ErrorKind::Open,
            Error::Insert { .. } => ErrorKind::Insert,
            Error::Fetch { .. } | Error::EmptyKeyIndex { .. } => ErrorKind::Fetch,
            Error::Size { .. } => ErrorKind::Size,
            Error::Close { .. } => ErrorKind::Close,
            Error::Reset { .. } => ErrorKind::Reset,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn open(backend: &str, table: &str, source: impl Into<BoxError>) -> Self {
        Error::Open {
            backend: backend.to_string(),
            table: table.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn insert(backend: &str, table: &str, source: impl Into<BoxError>) -> Self {
        Error::Insert {
            backend: backend.to_string(),
            table: table.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn fetch(backend: &str, table: &str, source: impl Into<BoxError>) -> Self {
        Error::Fetch {
            backend: backend.to_string(),
            table: table.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn size(backend: &str, table: &str, source: impl Into<BoxError>) -> Self {
        Error::Size {
            backend: backend.to_string(),
            table: table.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn close(backend: &str, table: &str, source: impl Into<BoxError>) -> Self {
        Error::Close {
            backend: backend.to_string(),
            table: table.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn reset(backend: &str, source: impl Into<BoxError>) -> Self {
        Error::Reset {
            backend: backend.to_string(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert_eq!(Error::open("sled", "Small", "boom").kind(), ErrorKind::Open);
        assert_eq!(Error::insert("sled", "Small", "boom").kind(), ErrorKind::Insert);
        assert_eq!(Error::fetch("sled", "Small", "boom").kind(), ErrorKind::Fetch);
        assert_eq!(Error::size("sled", "Small", "boom").kind(), ErrorKind::Size);
        assert_eq!(Error::close("sled", "Small", "boom").kind(), ErrorKind::Close);
        assert_eq!(Error::reset("sled", "boom").kind(), ErrorKind::Reset);
        assert_eq!(Error::Io(io).kind(), ErrorKind::Io);
        assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Config);
        assert_eq!(
            Error::EmptyKeyIndex {
                backend: "memory".into(),
                table: "Small".into(),
            }
            .kind(),
            ErrorKind::Fetch
        );
    }

    #[test]
    fn test_display_names_backend_and_table() {
        let err = Error::insert("sqlite", "Medium", "disk full");
        assert_eq!(
            err.to_string(),
            "sqlite: insert into 'Medium' failed: disk full"
        );
    }
}
