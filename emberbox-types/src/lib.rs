//! Core type definitions for the Emberbox emulator bridge.
//!
//! This crate defines the fundamental, emulator-agnostic types shared by the
//! bridge and the host application:
//! - Run and drive identifiers
//! - Mount state of a virtual drive
//!
//! Everything that carries bridge behavior (hook catalogue, dispatch,
//! authorization) belongs in `emberbox-bridge`, not here.

mod ids;
mod mount;

pub use ids::{DriveId, RunId};
pub use mount::MountState;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid drive letter: {0:?}")]
    InvalidDriveLetter(char),

    #[error("invalid drive spec: {0:?}")]
    InvalidDriveSpec(String),
}
