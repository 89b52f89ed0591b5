//! Identifier types used throughout the Emberbox bridge.
//!
//! Emulation runs use UUID v7 for time-ordered, globally unique identifiers.
//! Virtual drives use the guest's own drive-letter namespace.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for one emulation run.
/// Uses UUID v7 which embeds a timestamp for natural ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new run ID with the current timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a run ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses a run ID from a string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Opaque handle identifying a virtual drive in the guest.
///
/// Wraps the guest's drive-letter namespace (`A:` through `Z:`). The host may
/// use it only for identity comparison and lookup — it carries no access to
/// the drive's contents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "char", into = "char")]
pub struct DriveId(u8);

impl DriveId {
    /// Creates a drive ID from a drive letter. Accepts either case.
    pub fn from_letter(letter: char) -> Result<Self, Error> {
        match letter {
            'A'..='Z' => Ok(Self(letter as u8 - b'A')),
            'a'..='z' => Ok(Self(letter as u8 - b'a')),
            other => Err(Error::InvalidDriveLetter(other)),
        }
    }

    /// Returns the zero-based index of this drive (`A:` is 0).
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the uppercase drive letter.
    #[must_use]
    pub const fn letter(self) -> char {
        (b'A' + self.0) as char
    }
}

impl TryFrom<char> for DriveId {
    type Error = Error;

    fn try_from(letter: char) -> Result<Self, Error> {
        Self::from_letter(letter)
    }
}

impl From<DriveId> for char {
    fn from(drive: DriveId) -> char {
        drive.letter()
    }
}

impl fmt::Display for DriveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.letter())
    }
}

impl FromStr for DriveId {
    type Err = Error;

    /// Parses `"C"` or `"C:"`, either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(letter), None, None) | (Some(letter), Some(':'), None) => {
                Self::from_letter(letter)
            }
            _ => Err(Error::InvalidDriveSpec(s.to_string())),
        }
    }
}
