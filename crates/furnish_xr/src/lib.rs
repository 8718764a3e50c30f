//! # furnish_xr - AR Session Primitives
//!
//! The pieces of an AR session the interaction layer needs to know about:
//! - Poses (position + orientation) reported by tracking
//! - Per-frame timing on a session clock
//! - The surface probe, which yields a ground-plane pose once per frame
//!
//! ## Architecture
//!
//! The probe is a collaborator trait so the interaction core never talks to
//! a concrete tracking runtime:
//! 1. **Acquire**: `request_source` hands back a channel; the source arrives
//!    on a later frame and is never awaited inline
//! 2. **Query**: once the source is held, `query` is called once per frame
//! 3. **Release**: on session end the source is dropped and may be requested again
//!
//! ## Example
//!
//! ```ignore
//! use furnish_xr::prelude::*;
//!
//! let mut probe = ScriptedSurfaceProbe::new();
//! let pending = probe.request_source();
//!
//! // later frame
//! if let Ok(Ok(source)) = pending.try_recv() {
//!     let pose = probe.query(&source, &timing);
//! }
//! ```

pub mod probe;

pub use probe::{ScriptedSource, ScriptedSurfaceProbe};

use std::time::Duration;

use crossbeam_channel::Receiver;
use glam::{Quat, Vec3};
use thiserror::Error;

/// Pose (position + orientation)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    /// Create a new pose
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Pose at a position with no rotation
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

/// AR session lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Session is presenting frames
    Running,
    /// Session ended by the user or the runtime
    Ended,
}

/// Frame timing info
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTiming {
    /// Time since session start
    pub time: Duration,
    /// Time since last frame
    pub delta_time: f32,
    /// Frame index
    pub frame_index: u64,
}

impl FrameTiming {
    /// Timing for a frame at `time` on the session clock
    pub fn at(frame_index: u64, time: Duration, delta_time: f32) -> Self {
        Self {
            time,
            delta_time,
            frame_index,
        }
    }
}

/// Ground-plane probe supplied by the tracking runtime.
///
/// Source acquisition is fire-and-forget: the receiver is polled on later
/// frames and the probe is free to resolve it whenever it is ready.
pub trait SurfaceProbe {
    /// Handle to an acquired probe source
    type Source;

    /// Ask the runtime for a probe source.
    fn request_source(&mut self) -> Receiver<Result<Self::Source, XrError>>;

    /// Best ground-plane estimate for this frame, if any.
    fn query(&mut self, source: &Self::Source, timing: &FrameTiming) -> Option<Pose>;

    /// Drop any runtime state tied to the current source.
    fn release_source(&mut self) {}
}

/// XR error types
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum XrError {
    /// Probe source could not be created
    #[error("Surface probe unavailable: {0}")]
    SourceUnavailable(String),
    /// Request channel closed before a source arrived
    #[error("Surface probe request was dropped")]
    RequestDropped,
}

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::probe::{ScriptedSource, ScriptedSurfaceProbe};
    pub use crate::{FrameTiming, Pose, SessionState, SurfaceProbe, XrError};
}
