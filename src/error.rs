use std::io;

use thiserror::Error;

/// Errors reported by reparse point operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input was empty or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The target does not carry the reparse point attribute.
    #[error("not a reparse point")]
    NotAReparsePoint,

    /// The reparse tag could not be determined. Deletion cannot proceed
    /// without it, since the driver rejects a delete request whose tag does
    /// not match the tag on disk.
    #[error("reparse tag could not be determined")]
    TagUnknown,

    /// The target could not be opened with reparse point semantics.
    #[error("failed to open reparse point: {0}")]
    HandleOpenFailed(#[source] io::Error),

    /// The filesystem driver rejected or failed a control request.
    #[error("device io control failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
