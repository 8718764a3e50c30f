//! # furnish_input - Input event normalization
//!
//! Converts raw multi-touch and select-control events into three abstract
//! primitives (press, move, release) together with the active contact set,
//! so the gesture machine never sees the platform input API.

pub mod event;
pub mod normalizer;

pub use event::{InputEvent, Primitive, RawInput};
pub use normalizer::{InputNormalizer, SELECT_CONTACT_ID};
