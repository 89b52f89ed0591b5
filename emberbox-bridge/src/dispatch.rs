//! Core-facing hook dispatcher.
//!
//! Routes each call site to its registered handler, or applies the
//! documented default when none is installed. Every method runs
//! synchronously on the caller's execution context — the emulator core's
//! own thread — and holds no emulation state of its own beyond the cached
//! surface descriptor and the per-point reentrancy guards.
//!
//! Defaults are chosen so that a dispatcher with an empty registry behaves
//! as a fully autonomous, unmodified emulator: every filesystem operation is
//! allowed, nothing is hidden, every event is unhandled, and the run is
//! never paused or cancelled from outside.

use crate::authorize::{AccessKind, AuthorizationRequest, Decision};
use crate::drives::DriveCacheEntry;
use crate::hooks::{ExtensionPoint, HookOutcome, TitleInfo, WindowEvent};
use crate::lifecycle::LifecycleState;
use crate::registry::HookRegistry;
use crate::render::{RenderChannel, RenderStrategy, SurfaceDescriptor, SurfaceRequest};
use emberbox_types::DriveId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace};

/// Per-point reentrancy flags. Re-entering a point during its own dispatch
/// indicates undefined recursive state and aborts rather than proceeding.
struct ReentryGuards {
    flags: [AtomicBool; ExtensionPoint::COUNT],
}

impl ReentryGuards {
    fn new() -> Self {
        Self {
            flags: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }

    fn enter(&self, point: ExtensionPoint) -> PointGuard<'_> {
        let flag = &self.flags[point.index()];
        if flag.swap(true, Ordering::SeqCst) {
            panic!(
                "extension point `{}` re-entered during its own dispatch",
                point.name()
            );
        }
        PointGuard { flag }
    }
}

struct PointGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for PointGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

fn malformed_path(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.as_os_str().as_encoded_bytes().contains(&0)
}

fn malformed_name(name: &str) -> bool {
    name.is_empty() || name.contains('\0')
}

/// Routes core call sites to host handlers.
///
/// Owned by the host, injected into the core at construction. The registry
/// is fixed for the dispatcher's lifetime; to change handlers, the host
/// builds a new registry and a new dispatcher for the next run.
pub struct HookDispatcher {
    registry: HookRegistry,
    lifecycle: Arc<LifecycleState>,
    render: RenderChannel,
    guards: ReentryGuards,
}

impl HookDispatcher {
    pub fn new(registry: HookRegistry, lifecycle: Arc<LifecycleState>) -> Self {
        info!(
            run_id = %lifecycle.run_id(),
            registered = registry.registered_points().len(),
            "hook dispatcher created"
        );
        Self {
            registry,
            lifecycle,
            render: RenderChannel::new(),
            guards: ReentryGuards::new(),
        }
    }

    /// A dispatcher with no handlers at all: pure default-catalogue
    /// behavior, the emulator running as if no host were attached.
    #[must_use]
    pub fn autonomous() -> Self {
        Self::new(HookRegistry::new(), Arc::new(LifecycleState::new()))
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    pub fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }

    // ================================================================
    // Lifecycle polling
    // ================================================================

    /// Polled once per core iteration; true suspends emulated time while
    /// keeping the event pump alive.
    pub fn is_paused(&self) -> bool {
        self.lifecycle.is_paused()
    }

    /// Polled once per core iteration; true makes the core unwind its full
    /// execution stack and terminate cleanly.
    pub fn is_cancelled(&self) -> bool {
        self.lifecycle.is_cancelled()
    }

    // ================================================================
    // Frame/event and title hooks
    // ================================================================

    /// Lets the host pump its own event queue cooperatively.
    /// `Unhandled` means the core continues its own default idle/event
    /// handling for this tick; `Handled` means the host owns the tick.
    pub fn event_loop_tick(&self) -> HookOutcome {
        let _guard = self.guards.enter(ExtensionPoint::EventLoop);
        match &self.registry.event_loop {
            Some(handler) => handler(),
            None => HookOutcome::Unhandled,
        }
    }

    /// Offers a platform event to the host before the core's default
    /// handler; `Handled` means the core must not process it further.
    pub fn window_event(&self, event: &WindowEvent) -> HookOutcome {
        let _guard = self.guards.enter(ExtensionPoint::WindowEvent);
        let outcome = match &self.registry.window_event {
            Some(handler) => handler(event),
            None => HookOutcome::Unhandled,
        };
        trace!(event = ?event, outcome = ?outcome, "window event offered to host");
        outcome
    }

    /// `Handled` means the host has taken over title presentation and the
    /// core's own title-update logic must stay suppressed.
    pub fn title_change(&self, info: &TitleInfo) -> HookOutcome {
        let _guard = self.guards.enter(ExtensionPoint::TitleChange);
        let outcome = match &self.registry.title_change {
            Some(handler) => handler(info),
            None => HookOutcome::Unhandled,
        };
        debug!(
            cycles = info.cycles,
            frameskip = info.frameskip,
            paused = info.paused,
            outcome = ?outcome,
            "title change"
        );
        outcome
    }

    /// Notifies the host that the core reached its configuration-load point.
    pub fn apply_config_files(&self) {
        let _guard = self.guards.enter(ExtensionPoint::ApplyConfigFiles);
        debug!("applying config files");
        if let Some(handler) = &self.registry.apply_config_files {
            handler();
        }
    }

    // ================================================================
    // Rendering negotiation
    // ================================================================

    /// Requests a drawing surface. The host's answer — which may differ
    /// from the request — is cached for this surface generation and
    /// returned; with no handler the request is granted verbatim.
    pub fn setup_surface(&self, request: &SurfaceRequest) -> SurfaceDescriptor {
        let _guard = self.guards.enter(ExtensionPoint::SetupSurface);
        let descriptor = match &self.registry.setup_surface {
            Some(handler) => handler(request),
            None => SurfaceDescriptor::matching(request),
        };
        self.render.negotiate(descriptor);
        info!(
            requested_width = request.width,
            requested_height = request.height,
            negotiated = %descriptor,
            generation = self.render.generation(),
            "surface negotiated"
        );
        descriptor
    }

    /// Final opportunity for the host to adjust rendering parameters before
    /// frames begin flowing. The default leaves the strategy unchanged.
    pub fn apply_rendering_strategy(&self, strategy: &mut RenderStrategy) {
        let _guard = self.guards.enter(ExtensionPoint::ApplyRenderingStrategy);
        if let Some(handler) = &self.registry.apply_rendering_strategy {
            handler(strategy);
        }
        debug!(strategy = ?strategy, "rendering strategy applied");
    }

    /// The negotiated surface dimensions. The core must use these, not its
    /// original request, for subsequent layout math.
    ///
    /// # Panics
    /// If queried before [`setup_surface`](Self::setup_surface) has
    /// negotiated a surface for this generation.
    pub fn surface_size(&self) -> (u32, u32) {
        let _guard = self.guards.enter(ExtensionPoint::SurfaceSize);
        let descriptor = self.render.descriptor();
        (descriptor.width, descriptor.height)
    }

    /// The active color depth in bits per pixel.
    ///
    /// # Panics
    /// If queried before a surface was negotiated.
    pub fn color_depth(&self) -> u8 {
        let _guard = self.guards.enter(ExtensionPoint::ColorDepth);
        self.render.descriptor().bits_per_pixel
    }

    /// Monotonic counter bumped on every surface negotiation.
    pub fn surface_generation(&self) -> u64 {
        self.render.generation()
    }

    // ================================================================
    // String and path overrides
    // ================================================================

    /// Host override of the core's translation table; `None` falls back to
    /// the core's own strings. The returned value is owned by the caller.
    pub fn localized_string(&self, key: &str) -> Option<String> {
        let _guard = self.guards.enter(ExtensionPoint::LocalizedString);
        match &self.registry.localized_string {
            Some(handler) => handler(key),
            None => None,
        }
    }

    /// The current OS keyboard layout as a guest layout code; `None` keeps
    /// the core's own detection.
    pub fn keyboard_layout(&self) -> Option<String> {
        let _guard = self.guards.enter(ExtensionPoint::KeyboardLayout);
        match &self.registry.keyboard_layout {
            Some(handler) => handler(),
            None => None,
        }
    }

    /// Where a new capture/recording with the given extension should go;
    /// `None` keeps the core's default path.
    pub fn recording_path(&self, extension: &str) -> Option<PathBuf> {
        let _guard = self.guards.enter(ExtensionPoint::RecordingPath);
        match &self.registry.recording_path {
            Some(handler) => handler(extension),
            None => None,
        }
    }

    // ================================================================
    // Authorization gates
    // ================================================================

    /// Asked once, before a mount is established. `Deny` prevents the mount
    /// and is reported to the requester as a recoverable failure.
    pub fn authorize_mount(&self, path: &Path) -> Decision {
        let _guard = self.guards.enter(ExtensionPoint::MountAuthorization);
        let request = AuthorizationRequest {
            kind: AccessKind::Mount,
            path,
            drive: None,
        };
        let decision = match &self.registry.mount_authorization {
            Some(handler) => handler(path),
            None => Decision::Allow,
        };
        debug!(request = %request, decision = ?decision, "mount gate");
        decision
    }

    /// Asked on every write-intent check inside a mounted drive. `Deny`
    /// surfaces to the guest as a permission error; reads are unaffected.
    /// A malformed path is treated as a non-match and denied without
    /// consulting the handler.
    pub fn authorize_write(&self, path: &Path, drive: DriveId) -> Decision {
        let _guard = self.guards.enter(ExtensionPoint::WriteAuthorization);
        let request = AuthorizationRequest {
            kind: AccessKind::Write,
            path,
            drive: Some(drive),
        };
        let decision = if malformed_path(path) {
            Decision::Deny
        } else {
            match &self.registry.write_authorization {
                Some(handler) => handler(path, drive),
                None => Decision::Allow,
            }
        };
        trace!(request = %request, decision = ?decision, "write gate");
        decision
    }

    /// Asked per entry while enumerating a host directory backing a virtual
    /// drive. `Deny` removes the entry from the guest-visible listing; the
    /// guest never learns the file exists. A malformed name is denied
    /// without consulting the handler.
    pub fn authorize_visibility(&self, name: &str) -> Decision {
        let _guard = self.guards.enter(ExtensionPoint::FileVisibility);
        let request = AuthorizationRequest {
            kind: AccessKind::Visibility,
            path: Path::new(name),
            drive: None,
        };
        let decision = if malformed_name(name) {
            Decision::Deny
        } else {
            match &self.registry.file_visibility {
                Some(handler) => handler(name),
                None => Decision::Allow,
            }
        };
        trace!(request = %request, decision = ?decision, "visibility gate");
        decision
    }

    // ================================================================
    // Shell lifecycle
    // ================================================================

    /// The guest's startup script began executing. Informational; sits on
    /// the guest-visible startup critical path, so handlers must not block.
    pub fn autoexec_started(&self) {
        let _guard = self.guards.enter(ExtensionPoint::AutoexecStart);
        debug!(event = crate::shell::ShellEvent::AutoexecStart.label(), "shell event");
        if let Some(handler) = &self.registry.autoexec_start {
            handler();
        }
    }

    /// The guest's startup script finished executing.
    pub fn autoexec_ended(&self) {
        let _guard = self.guards.enter(ExtensionPoint::AutoexecEnd);
        debug!(event = crate::shell::ShellEvent::AutoexecEnd.label(), "shell event");
        if let Some(handler) = &self.registry.autoexec_end {
            handler();
        }
    }

    /// Control returned to an idle guest prompt.
    pub fn returned_to_prompt(&self) {
        let _guard = self.guards.enter(ExtensionPoint::ReturnToPrompt);
        debug!(event = crate::shell::ShellEvent::ReturnToPrompt.label(), "shell event");
        if let Some(handler) = &self.registry.return_to_prompt {
            handler();
        }
    }

    /// Offered before the core's built-in command table. `Handled` means
    /// the host fully processed the command and the built-in must not run.
    pub fn shell_command(&self, name: &str, args: &str) -> HookOutcome {
        let _guard = self.guards.enter(ExtensionPoint::ShellCommand);
        let outcome = match &self.registry.shell_command {
            Some(handler) => handler(name, args),
            None => HookOutcome::Unhandled,
        };
        debug!(command = name, args, outcome = ?outcome, "shell command");
        outcome
    }

    // ================================================================
    // Drive cache synchronization
    // ================================================================

    /// Delivers a snapshot of the core's current drive table to the host
    /// mirror. Fired immediately after every mount or unmount completes,
    /// in order, never coalesced. Host-side failure is invisible to the
    /// core by design.
    pub fn sync_drive_cache(&self, entries: &[DriveCacheEntry]) {
        let _guard = self.guards.enter(ExtensionPoint::SyncDriveCache);
        debug!(entries = entries.len(), "drive cache sync");
        if let Some(handler) = &self.registry.sync_drive_cache {
            handler(entries);
        }
    }
}
