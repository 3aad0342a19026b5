use std::io;
use std::path::PathBuf;

/// Errors surfaced by dictionary access and the offline builder.
///
/// Contract violations (permutation index out of range, member index past a
/// validated group size) are asserts, not variants: they indicate a builder
/// bug, and a well-built dictionary pair makes them unreachable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dictionary entry {key:?} is malformed: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("group {label:?} is referenced but missing from g2w")]
    UnknownGroup { label: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
