//! The core's virtual-drive table and its host-mirror synchronization.
//!
//! [`DriveTable`] is the authoritative state; the host maintains a mirror
//! that it rebuilds from the snapshot delivered through the sync-drive-cache
//! hook. Every mount and unmount fires exactly one notification, in the
//! order the transitions happened, before control returns to whatever
//! requested the operation.

use crate::dispatch::HookDispatcher;
use crate::error::DriveError;
use emberbox_types::{DriveId, MountState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One row of the drive-table snapshot handed to the host mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveCacheEntry {
    pub drive: DriveId,
    pub mount_path: PathBuf,
    pub state: MountState,
}

#[derive(Debug, Clone)]
struct Volume {
    path: PathBuf,
    state: MountState,
}

/// The core-owned table of virtual drives.
///
/// Mutated exclusively through this API, on the core's thread. After an
/// unmount the row is kept with [`MountState::Unmounted`] so the snapshot
/// records the transition; remounting the same letter replaces the row.
#[derive(Debug, Default)]
pub struct DriveTable {
    volumes: BTreeMap<DriveId, Volume>,
}

impl DriveTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self, drive: DriveId) -> bool {
        self.volumes
            .get(&drive)
            .is_some_and(|volume| volume.state.is_mounted())
    }

    /// The host path backing a drive, if it currently has a mounted volume.
    pub fn mounted_path(&self, drive: DriveId) -> Option<&Path> {
        self.volumes
            .get(&drive)
            .filter(|volume| volume.state.is_mounted())
            .map(|volume| volume.path.as_path())
    }

    pub fn mounted_count(&self) -> usize {
        self.volumes
            .values()
            .filter(|volume| volume.state.is_mounted())
            .count()
    }

    /// Read-only snapshot of the table in drive-letter order.
    pub fn snapshot(&self) -> Vec<DriveCacheEntry> {
        self.volumes
            .iter()
            .map(|(drive, volume)| DriveCacheEntry {
                drive: *drive,
                mount_path: volume.path.clone(),
                state: volume.state,
            })
            .collect()
    }

    /// Mounts a host path on a drive.
    ///
    /// The mount gate is asked before anything changes; `Deny` is a normal,
    /// recoverable failure reported to whatever triggered the mount. On
    /// success the host mirror is synchronized before this returns.
    pub fn mount(
        &mut self,
        drive: DriveId,
        path: impl Into<PathBuf>,
        hooks: &HookDispatcher,
    ) -> Result<(), DriveError> {
        let path = path.into();
        if self.is_mounted(drive) {
            return Err(DriveError::AlreadyMounted(drive));
        }
        if !hooks.authorize_mount(&path).is_allowed() {
            info!(%drive, path = %path.display(), "mount refused by host");
            return Err(DriveError::MountRefused { drive, path });
        }

        self.volumes.insert(
            drive,
            Volume {
                path: path.clone(),
                state: MountState::Mounted,
            },
        );
        info!(%drive, path = %path.display(), "drive mounted");
        hooks.sync_drive_cache(&self.snapshot());
        Ok(())
    }

    /// Unmounts a drive's volume, returning the host path it was backed by.
    /// The host mirror is synchronized before this returns.
    pub fn unmount(
        &mut self,
        drive: DriveId,
        hooks: &HookDispatcher,
    ) -> Result<PathBuf, DriveError> {
        let volume = self
            .volumes
            .get_mut(&drive)
            .filter(|volume| volume.state.is_mounted())
            .ok_or(DriveError::NotMounted(drive))?;

        volume.state = MountState::Unmounted;
        let path = volume.path.clone();
        info!(%drive, path = %path.display(), "drive unmounted");
        hooks.sync_drive_cache(&self.snapshot());
        Ok(path)
    }

    /// Checks write intent for a path inside a mounted drive. `Deny` from
    /// the gate becomes a permission error visible to the guest; the
    /// underlying host file is never touched.
    pub fn check_write_access(
        &self,
        drive: DriveId,
        path: &Path,
        hooks: &HookDispatcher,
    ) -> Result<(), DriveError> {
        if !self.is_mounted(drive) {
            return Err(DriveError::NotMounted(drive));
        }
        if hooks.authorize_write(path, drive).is_allowed() {
            Ok(())
        } else {
            debug!(%drive, path = %path.display(), "write denied");
            Err(DriveError::WriteDenied {
                drive,
                path: path.to_path_buf(),
            })
        }
    }
}

/// Filters a host-directory enumeration down to the guest-visible entries.
/// Names the visibility gate denies are dropped entirely.
pub fn filter_listing(
    hooks: &HookDispatcher,
    names: impl IntoIterator<Item = String>,
) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| hooks.authorize_visibility(name).is_allowed())
        .collect()
}
