//! Error types for resource resolution and bundle export.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by locale groups and the resource manager.
///
/// Loader/saver failures are carried through the `Resource` variant
/// unchanged; this crate never remaps or suppresses them.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Not even the fallback locale's file exists in the group folder.
    /// Fatal, since no further fallback exists.
    #[error("missing default resource in {folder:?} (searched {stems:?} with extension '{extension}')")]
    MissingDefaultResource {
        folder: PathBuf,
        stems: Vec<String>,
        extension: String,
    },

    /// A required bundle resource yielded nothing after export.
    #[error("missing resource at {0:?}")]
    MissingResource(PathBuf),

    /// Filesystem or export failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A loader or saver failed; the underlying error passes through.
    #[error(transparent)]
    Resource(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ResourceError>;
