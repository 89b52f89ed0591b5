//! Error types for the bridge.
//!
//! Authorization denials are ordinary recoverable outcomes, never panics;
//! the guest sees them as permission or not-found style failures.

use emberbox_types::DriveId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("host refused to mount {path} on drive {drive}")]
    MountRefused { drive: DriveId, path: PathBuf },

    #[error("drive {0} already has a mounted volume")]
    AlreadyMounted(DriveId),

    #[error("drive {0} has no mounted volume")]
    NotMounted(DriveId),

    #[error("write access to {path} on drive {drive} denied")]
    WriteDenied { drive: DriveId, path: PathBuf },
}
