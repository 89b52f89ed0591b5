//! Extension-point bridge between the Emberbox host and its embedded
//! emulator core.
//!
//! The core, while running, reaches fixed call sites — "about to mount a
//! path", "about to write a file", "frame tick elapsed" — and synchronously
//! invokes the matching extension point through a [`HookDispatcher`]. The
//! host decides; the core resumes with the decision. With no handlers
//! installed the defaults leave the emulator fully autonomous.
//!
//! The host builds a [`HookRegistry`], optionally wires in the stock
//! [`HostPolicy`] rules, and injects both the registry and a per-run
//! [`LifecycleState`] into the dispatcher at construction. All dispatch is
//! single-threaded and synchronous; cancellation is cooperative and polled.

mod authorize;
mod dispatch;
mod drives;
mod error;
mod hooks;
mod lifecycle;
mod policy;
mod registry;
mod render;
mod shell;

pub use authorize::{AccessKind, AuthorizationRequest, Decision};
pub use dispatch::HookDispatcher;
pub use drives::{DriveCacheEntry, DriveTable, filter_listing};
pub use error::DriveError;
pub use hooks::{ExtensionPoint, HookOutcome, TitleInfo, WindowEvent};
pub use lifecycle::{LifecycleState, RunPhase};
pub use policy::{HostPolicy, HostPolicyConfig};
pub use registry::HookRegistry;
pub use render::{RenderStrategy, ScalingMode, SurfaceDescriptor, SurfaceFlags, SurfaceRequest};
pub use shell::ShellEvent;

// Re-exported for convenience; these cross the boundary in hook signatures.
pub use emberbox_types::{DriveId, MountState, RunId};
