//! Authorization gate vocabulary.
//!
//! Filesystem-affecting operations are gated by yes/no questions answered
//! before the operation proceeds. The permitted/denied polarity is kept
//! distinct from the handled/unhandled polarity of ordinary hooks.

use emberbox_types::DriveId;
use std::fmt;
use std::path::Path;

/// Answer to an authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// `Allow` when the condition holds.
    #[must_use]
    pub const fn allow_if(condition: bool) -> Self {
        if condition { Self::Allow } else { Self::Deny }
    }
}

/// Which family of filesystem question is being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Mount,
    Write,
    Visibility,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mount => write!(f, "mount"),
            Self::Write => write!(f, "write"),
            Self::Visibility => write!(f, "visibility"),
        }
    }
}

/// One authorization question, constructed per call for logging.
/// Never stored; the gate is answered before the operation proceeds.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationRequest<'a> {
    pub kind: AccessKind,
    pub path: &'a Path,
    /// The owning virtual drive; absent for mount and visibility checks.
    pub drive: Option<DriveId>,
}

impl fmt::Display for AuthorizationRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.drive {
            Some(drive) => write!(f, "{} {} on {}", self.kind, self.path.display(), drive),
            None => write!(f, "{} {}", self.kind, self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_helpers() {
        assert!(Decision::Allow.is_allowed());
        assert!(!Decision::Deny.is_allowed());
        assert_eq!(Decision::allow_if(true), Decision::Allow);
        assert_eq!(Decision::allow_if(false), Decision::Deny);
    }

    #[test]
    fn request_display_with_drive() {
        let drive = DriveId::from_letter('C').unwrap();
        let request = AuthorizationRequest {
            kind: AccessKind::Write,
            path: Path::new("GAME\\SAVE.DAT"),
            drive: Some(drive),
        };
        assert_eq!(request.to_string(), "write GAME\\SAVE.DAT on C:");
    }

    #[test]
    fn request_display_without_drive() {
        let request = AuthorizationRequest {
            kind: AccessKind::Mount,
            path: Path::new("/games/keen"),
            drive: None,
        };
        assert_eq!(request.to_string(), "mount /games/keen");
    }
}
