//! Host-owned handler registry.
//!
//! The host builds a [`HookRegistry`], installs a handler for each point it
//! wants to intercept, and hands the registry to the dispatcher at
//! construction. At most one handler per point; installing another replaces
//! the previous one. The core never mutates the registry — it only reads
//! through it via the dispatcher.

use crate::authorize::Decision;
use crate::drives::DriveCacheEntry;
use crate::hooks::{ExtensionPoint, HookOutcome, TitleInfo, WindowEvent};
use crate::render::{RenderStrategy, SurfaceDescriptor, SurfaceRequest};
use emberbox_types::DriveId;
use std::path::{Path, PathBuf};

pub(crate) type EventLoopHandler = Box<dyn Fn() -> HookOutcome + Send + Sync>;
pub(crate) type WindowEventHandler = Box<dyn Fn(&WindowEvent) -> HookOutcome + Send + Sync>;
pub(crate) type TitleChangeHandler = Box<dyn Fn(&TitleInfo) -> HookOutcome + Send + Sync>;
pub(crate) type NotifyHandler = Box<dyn Fn() + Send + Sync>;
pub(crate) type SetupSurfaceHandler =
    Box<dyn Fn(&SurfaceRequest) -> SurfaceDescriptor + Send + Sync>;
pub(crate) type RenderStrategyHandler = Box<dyn Fn(&mut RenderStrategy) + Send + Sync>;
pub(crate) type LocalizedStringHandler = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;
pub(crate) type KeyboardLayoutHandler = Box<dyn Fn() -> Option<String> + Send + Sync>;
pub(crate) type RecordingPathHandler = Box<dyn Fn(&str) -> Option<PathBuf> + Send + Sync>;
pub(crate) type MountGateHandler = Box<dyn Fn(&Path) -> Decision + Send + Sync>;
pub(crate) type WriteGateHandler = Box<dyn Fn(&Path, DriveId) -> Decision + Send + Sync>;
pub(crate) type VisibilityGateHandler = Box<dyn Fn(&str) -> Decision + Send + Sync>;
pub(crate) type ShellCommandHandler = Box<dyn Fn(&str, &str) -> HookOutcome + Send + Sync>;
pub(crate) type SyncDriveCacheHandler = Box<dyn Fn(&[DriveCacheEntry]) + Send + Sync>;

/// One replaceable handler slot per extension point.
///
/// Handlers run synchronously on the core's own call stack and must not
/// block for unbounded durations; the authorization gates in particular sit
/// on the guest's file-I/O hot path. Handlers are `Send + Sync` only so a
/// registry built on the host's setup thread can be handed to the core's
/// loop thread.
#[derive(Default)]
pub struct HookRegistry {
    pub(crate) event_loop: Option<EventLoopHandler>,
    pub(crate) window_event: Option<WindowEventHandler>,
    pub(crate) title_change: Option<TitleChangeHandler>,
    pub(crate) apply_config_files: Option<NotifyHandler>,
    pub(crate) setup_surface: Option<SetupSurfaceHandler>,
    pub(crate) apply_rendering_strategy: Option<RenderStrategyHandler>,
    pub(crate) localized_string: Option<LocalizedStringHandler>,
    pub(crate) keyboard_layout: Option<KeyboardLayoutHandler>,
    pub(crate) recording_path: Option<RecordingPathHandler>,
    pub(crate) mount_authorization: Option<MountGateHandler>,
    pub(crate) write_authorization: Option<WriteGateHandler>,
    pub(crate) file_visibility: Option<VisibilityGateHandler>,
    pub(crate) autoexec_start: Option<NotifyHandler>,
    pub(crate) autoexec_end: Option<NotifyHandler>,
    pub(crate) return_to_prompt: Option<NotifyHandler>,
    pub(crate) shell_command: Option<ShellCommandHandler>,
    pub(crate) sync_drive_cache: Option<SyncDriveCacheHandler>,
}

impl HookRegistry {
    /// An empty registry: every point falls through to its documented
    /// default, which leaves the emulator fully autonomous.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event_loop(
        &mut self,
        handler: impl Fn() -> HookOutcome + Send + Sync + 'static,
    ) -> &mut Self {
        self.event_loop = Some(Box::new(handler));
        self
    }

    pub fn on_window_event(
        &mut self,
        handler: impl Fn(&WindowEvent) -> HookOutcome + Send + Sync + 'static,
    ) -> &mut Self {
        self.window_event = Some(Box::new(handler));
        self
    }

    pub fn on_title_change(
        &mut self,
        handler: impl Fn(&TitleInfo) -> HookOutcome + Send + Sync + 'static,
    ) -> &mut Self {
        self.title_change = Some(Box::new(handler));
        self
    }

    pub fn on_apply_config_files(
        &mut self,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> &mut Self {
        self.apply_config_files = Some(Box::new(handler));
        self
    }

    /// The handler receives the core's request and returns the surface it
    /// actually created; the host owns the surface's lifetime afterwards.
    pub fn on_setup_surface(
        &mut self,
        handler: impl Fn(&SurfaceRequest) -> SurfaceDescriptor + Send + Sync + 'static,
    ) -> &mut Self {
        self.setup_surface = Some(Box::new(handler));
        self
    }

    pub fn on_apply_rendering_strategy(
        &mut self,
        handler: impl Fn(&mut RenderStrategy) + Send + Sync + 'static,
    ) -> &mut Self {
        self.apply_rendering_strategy = Some(Box::new(handler));
        self
    }

    /// `None` from the handler falls back to the core's own string tables.
    pub fn on_localized_string(
        &mut self,
        handler: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> &mut Self {
        self.localized_string = Some(Box::new(handler));
        self
    }

    pub fn on_keyboard_layout(
        &mut self,
        handler: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> &mut Self {
        self.keyboard_layout = Some(Box::new(handler));
        self
    }

    /// The handler receives the recording's file extension and may return
    /// the full destination path; `None` keeps the core's default location.
    pub fn on_recording_path(
        &mut self,
        handler: impl Fn(&str) -> Option<PathBuf> + Send + Sync + 'static,
    ) -> &mut Self {
        self.recording_path = Some(Box::new(handler));
        self
    }

    pub fn on_mount_authorization(
        &mut self,
        handler: impl Fn(&Path) -> Decision + Send + Sync + 'static,
    ) -> &mut Self {
        self.mount_authorization = Some(Box::new(handler));
        self
    }

    /// Called on every write-intent check inside a mounted drive; must be
    /// cheap, in-memory rule evaluation only.
    pub fn on_write_authorization(
        &mut self,
        handler: impl Fn(&Path, DriveId) -> Decision + Send + Sync + 'static,
    ) -> &mut Self {
        self.write_authorization = Some(Box::new(handler));
        self
    }

    /// Must be a pure function of the name; a denied name never appears in
    /// any guest-visible listing.
    pub fn on_file_visibility(
        &mut self,
        handler: impl Fn(&str) -> Decision + Send + Sync + 'static,
    ) -> &mut Self {
        self.file_visibility = Some(Box::new(handler));
        self
    }

    pub fn on_autoexec_start(&mut self, handler: impl Fn() + Send + Sync + 'static) -> &mut Self {
        self.autoexec_start = Some(Box::new(handler));
        self
    }

    pub fn on_autoexec_end(&mut self, handler: impl Fn() + Send + Sync + 'static) -> &mut Self {
        self.autoexec_end = Some(Box::new(handler));
        self
    }

    pub fn on_return_to_prompt(
        &mut self,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> &mut Self {
        self.return_to_prompt = Some(Box::new(handler));
        self
    }

    pub fn on_shell_command(
        &mut self,
        handler: impl Fn(&str, &str) -> HookOutcome + Send + Sync + 'static,
    ) -> &mut Self {
        self.shell_command = Some(Box::new(handler));
        self
    }

    /// The handler receives a read-only snapshot of the core's current drive
    /// table and rebuilds its own view from it; it is not told what changed.
    pub fn on_sync_drive_cache(
        &mut self,
        handler: impl Fn(&[DriveCacheEntry]) + Send + Sync + 'static,
    ) -> &mut Self {
        self.sync_drive_cache = Some(Box::new(handler));
        self
    }

    /// Whether a handler is installed for the given point.
    ///
    /// `surface-size` and `color-depth` resolve against the dispatcher's
    /// cached descriptor and take no handler, so they always report false.
    pub fn is_registered(&self, point: ExtensionPoint) -> bool {
        match point {
            ExtensionPoint::EventLoop => self.event_loop.is_some(),
            ExtensionPoint::WindowEvent => self.window_event.is_some(),
            ExtensionPoint::TitleChange => self.title_change.is_some(),
            ExtensionPoint::ApplyConfigFiles => self.apply_config_files.is_some(),
            ExtensionPoint::SetupSurface => self.setup_surface.is_some(),
            ExtensionPoint::SurfaceSize | ExtensionPoint::ColorDepth => false,
            ExtensionPoint::ApplyRenderingStrategy => self.apply_rendering_strategy.is_some(),
            ExtensionPoint::LocalizedString => self.localized_string.is_some(),
            ExtensionPoint::KeyboardLayout => self.keyboard_layout.is_some(),
            ExtensionPoint::RecordingPath => self.recording_path.is_some(),
            ExtensionPoint::MountAuthorization => self.mount_authorization.is_some(),
            ExtensionPoint::WriteAuthorization => self.write_authorization.is_some(),
            ExtensionPoint::FileVisibility => self.file_visibility.is_some(),
            ExtensionPoint::AutoexecStart => self.autoexec_start.is_some(),
            ExtensionPoint::AutoexecEnd => self.autoexec_end.is_some(),
            ExtensionPoint::ReturnToPrompt => self.return_to_prompt.is_some(),
            ExtensionPoint::ShellCommand => self.shell_command.is_some(),
            ExtensionPoint::SyncDriveCache => self.sync_drive_cache.is_some(),
        }
    }

    /// All points that currently have a handler installed.
    pub fn registered_points(&self) -> Vec<ExtensionPoint> {
        ExtensionPoint::ALL
            .into_iter()
            .filter(|point| self.is_registered(*point))
            .collect()
    }
}
