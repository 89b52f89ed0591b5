//! Rendering negotiation between the core and the host.
//!
//! The core requests a surface with [`SurfaceRequest`]; the host answers
//! with the [`SurfaceDescriptor`] it actually created, which may differ from
//! the request (e.g. a scaler doubling both dimensions). The dispatcher
//! caches the descriptor per surface generation, and all subsequent layout
//! queries read the negotiated values, never the original request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Pixel-surface creation flags requested by the core.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SurfaceFlags(u32);

impl SurfaceFlags {
    pub const FULLSCREEN: Self = Self(1 << 0);
    pub const DOUBLE_BUFFER: Self = Self(1 << 1);
    pub const HARDWARE: Self = Self(1 << 2);
    pub const RESIZABLE: Self = Self(1 << 3);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SurfaceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SurfaceFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Scaler applied between the emulated framebuffer and the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMode {
    #[default]
    None,
    Normal2x,
    Normal3x,
    Smooth,
}

/// Surface geometry and depth the core asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceRequest {
    pub width: u32,
    pub height: u32,
    pub flags: SurfaceFlags,
    pub bits_per_pixel: u8,
}

/// The surface the host actually created. Cached by the dispatcher until the
/// next negotiation; the host owns the surface's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceDescriptor {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u8,
    pub scaling: ScalingMode,
}

impl SurfaceDescriptor {
    /// Identity negotiation: a surface exactly matching the request, with no
    /// scaling. This is the default when no host handler is installed.
    #[must_use]
    pub fn matching(request: &SurfaceRequest) -> Self {
        Self {
            width: request.width,
            height: request.height,
            bits_per_pixel: request.bits_per_pixel,
            scaling: ScalingMode::None,
        }
    }
}

impl fmt::Display for SurfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}@{}bpp ({:?})",
            self.width, self.height, self.bits_per_pixel, self.scaling
        )
    }
}

/// Rendering parameters the host may adjust in the
/// apply-rendering-strategy hook, after surface and display mode are
/// otherwise settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStrategy {
    pub scaler: ScalingMode,
    pub aspect_correction: bool,
}

/// Cache of the most recently negotiated surface.
///
/// Ordering contract: a negotiation must complete before geometry or depth
/// are queried for that surface generation. Querying first is a
/// programming-contract violation and panics.
pub(crate) struct RenderChannel {
    surface: Mutex<Option<SurfaceDescriptor>>,
    generation: AtomicU64,
}

impl RenderChannel {
    pub(crate) fn new() -> Self {
        Self {
            surface: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn negotiate(&self, descriptor: SurfaceDescriptor) {
        *self.surface.lock().expect("render channel poisoned") = Some(descriptor);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn descriptor(&self) -> SurfaceDescriptor {
        self.surface
            .lock()
            .expect("render channel poisoned")
            .unwrap_or_else(|| {
                panic!("surface queried before setup-surface negotiated one")
            })
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
