//! The fixed extension-point catalogue.
//!
//! Each variant of [`ExtensionPoint`] names one call site where the emulator
//! core cedes a decision to the host. The catalogue is defined at build time
//! and never added to at runtime; the dispatcher's per-point reentrancy
//! guards and the registry's handler slots are both indexed by it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named call site where the core hands control to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionPoint {
    /// Once per core iteration, before the core's own idle/event handling.
    EventLoop,
    /// Per platform input/window event, before the core's default handler.
    WindowEvent,
    /// Internal state that would normally update a window title changed.
    TitleChange,
    /// The core reached its configuration-load point.
    ApplyConfigFiles,
    /// The core requests a drawing surface for the given geometry and depth.
    SetupSurface,
    /// The core queries the negotiated surface dimensions.
    SurfaceSize,
    /// The core queries the active color depth.
    ColorDepth,
    /// Final chance to adjust scaler/aspect parameters before frames flow.
    ApplyRenderingStrategy,
    /// Host override of the core's translation table.
    LocalizedString,
    /// Host supplies the current OS keyboard layout as a guest layout code.
    KeyboardLayout,
    /// Host overrides the destination path of a new capture/recording.
    RecordingPath,
    /// A mount is about to be established.
    MountAuthorization,
    /// A write inside a mounted virtual drive is about to happen.
    WriteAuthorization,
    /// A host directory entry is about to become guest-visible.
    FileVisibility,
    /// The guest's startup script began executing.
    AutoexecStart,
    /// The guest's startup script finished executing.
    AutoexecEnd,
    /// Control returned to an idle guest prompt.
    ReturnToPrompt,
    /// A shell command was issued, before the built-in command table runs.
    ShellCommand,
    /// The core's virtual-drive table changed.
    SyncDriveCache,
}

impl ExtensionPoint {
    /// Number of points in the catalogue.
    pub const COUNT: usize = 19;

    /// Every point in the catalogue, in declaration order.
    pub const ALL: [ExtensionPoint; Self::COUNT] = [
        Self::EventLoop,
        Self::WindowEvent,
        Self::TitleChange,
        Self::ApplyConfigFiles,
        Self::SetupSurface,
        Self::SurfaceSize,
        Self::ColorDepth,
        Self::ApplyRenderingStrategy,
        Self::LocalizedString,
        Self::KeyboardLayout,
        Self::RecordingPath,
        Self::MountAuthorization,
        Self::WriteAuthorization,
        Self::FileVisibility,
        Self::AutoexecStart,
        Self::AutoexecEnd,
        Self::ReturnToPrompt,
        Self::ShellCommand,
        Self::SyncDriveCache,
    ];

    /// Stable name of this point, used in logs and panic messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EventLoop => "event-loop",
            Self::WindowEvent => "window-event",
            Self::TitleChange => "title-change",
            Self::ApplyConfigFiles => "apply-config-files",
            Self::SetupSurface => "setup-surface",
            Self::SurfaceSize => "surface-size",
            Self::ColorDepth => "color-depth",
            Self::ApplyRenderingStrategy => "apply-rendering-strategy",
            Self::LocalizedString => "localized-string",
            Self::KeyboardLayout => "keyboard-layout",
            Self::RecordingPath => "recording-path",
            Self::MountAuthorization => "mount-authorization",
            Self::WriteAuthorization => "write-authorization",
            Self::FileVisibility => "file-visibility",
            Self::AutoexecStart => "autoexec-start",
            Self::AutoexecEnd => "autoexec-end",
            Self::ReturnToPrompt => "return-to-prompt",
            Self::ShellCommand => "shell-command",
            Self::SyncDriveCache => "sync-drive-cache",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a "did you handle this" hook reported back.
///
/// `Handled` means the host fully consumed the call and the core must
/// suppress its default behavior for it; `Unhandled` means the core proceeds
/// as if no host were attached. This replaces the bare boolean of the
/// original hook table, whose polarity varied per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookOutcome {
    Handled,
    Unhandled,
}

impl HookOutcome {
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Platform input/window event offered to the host before the core's default
/// handler. The windowing backend itself is an external collaborator, so this
/// is a neutral projection of its event union; events the projection does not
/// model arrive as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    FocusGained,
    FocusLost,
    CloseRequested,
    KeyDown { scancode: u32 },
    KeyUp { scancode: u32 },
    MouseMotion { x: i32, y: i32 },
    MouseButton { button: u8, pressed: bool },
    Other(u32),
}

/// Payload of the title-change hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleInfo {
    pub cycles: i32,
    pub frameskip: i32,
    pub paused: bool,
}
