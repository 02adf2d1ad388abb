//! Content-addressed digest of a directory tree.
//!
//! A site deploy starts from a [FileDigest]: every regular file under a root
//! directory is hashed in full and recorded twice, once as a manifest from
//! site path to content hash, and once as a reverse index from content hash
//! to the local files carrying that content. The server diffs the manifest
//! against its content store; the index tells us which local file to read
//! when it asks for a hash back.

use std::path::PathBuf;

use thiserror::Error;

mod digest;
mod hash;

pub use digest::{site_path, FileDigest};
pub use hash::{Hash, HashParseError, Hasher};

#[remain::sorted]
#[derive(Debug, Error)]
pub enum CasError {
    /// The tree walk found zero regular files. Deploying an empty site is
    /// almost always a mistake (wrong directory, build not run), so it is
    /// rejected before anything touches the network.
    #[error("no files found under {0}, refusing to deploy an empty tree")]
    EmptyTree(PathBuf),

    #[error("invalid digest entry point. {0} must be a directory")]
    InvalidEntry(PathBuf),

    /// Error that may occur while I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

pub type CasResult<T> = Result<T, CasError>;
