//! Mount state of a virtual drive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a virtual drive currently has a mounted volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountState {
    Mounted,
    Unmounted,
}

impl MountState {
    #[must_use]
    pub const fn is_mounted(self) -> bool {
        matches!(self, Self::Mounted)
    }
}

impl fmt::Display for MountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mounted => write!(f, "mounted"),
            Self::Unmounted => write!(f, "unmounted"),
        }
    }
}
