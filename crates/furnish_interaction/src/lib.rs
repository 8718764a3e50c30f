//! # furnish_interaction - Gesture-driven furniture placement
//!
//! Turns one ambiguous input channel into placement, selection, rotation
//! and deletion of furniture in an AR view.
//!
//! ## Architecture
//!
//! ```text
//! RawInput -> InputNormalizer -> GestureDisambiguator -> ObjectRegistry
//!                                                     -> SelectionController
//! FrameInput -> FrameCoordinator (probe, reticle, indicator refresh, render)
//! ```
//!
//! - Long press on an object selects it; on the selected object deletes it;
//!   on empty space deselects
//! - Double tap places the current model at the reticle and selects it
//! - Two-point horizontal drag rotates the selection
//!
//! [`ArSession`] owns all of it for the lifetime of one AR session.
//!
//! ## Example
//!
//! ```ignore
//! use furnish_interaction::prelude::*;
//!
//! let mut session = ArSession::with_scene_loader(config, scene, probe);
//! session.handle_input(RawInput::TouchDown { id: 0, x: 540.0, y: 900.0, time_ms: 0 });
//! let report = session.frame(FrameInput::new(timing, camera));
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod gesture;
pub mod registry;
pub mod selection;
pub mod session;

pub use config::{GestureConfig, InteractionConfig, SelectionConfig, SurfaceConfig, TrackingLossPolicy};
pub use error::{ConfigError, ConfigResult};
pub use frame::{FrameCoordinator, FrameInput, FrameReport, TrackingState};
pub use gesture::{
    GestureContext, GestureDisambiguator, GestureInput, GestureMachine, GestureOutcome, GestureState,
    RotationSession,
};
pub use registry::{ObjectId, ObjectRegistry, PlacedObject};
pub use selection::{SelectionChange, SelectionController};
pub use session::{ArSession, SessionAction};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::InteractionConfig;
    pub use crate::frame::{FrameInput, FrameReport, TrackingState};
    pub use crate::gesture::{GestureOutcome, GestureState};
    pub use crate::registry::{ObjectId, PlacedObject};
    pub use crate::session::{ArSession, SessionAction};
    pub use furnish_input::RawInput;
    pub use furnish_scene::CameraView;
    pub use furnish_xr::{FrameTiming, Pose};
}
