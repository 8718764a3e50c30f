//! Raw and normalized input events

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Raw event from the platform input layer.
///
/// Touch events carry a contact id so multi-touch can be tracked. The
/// abstract select control (a head-mounted "select" button) has no
/// position of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawInput {
    /// Touch started
    TouchDown { id: u64, x: f32, y: f32, time_ms: u64 },
    /// Touch moved
    TouchMotion { id: u64, x: f32, y: f32, time_ms: u64 },
    /// Touch ended
    TouchUp { id: u64, time_ms: u64 },
    /// Touch cancelled by the platform
    TouchCancel { id: u64, time_ms: u64 },
    /// Select control pressed
    SelectStart { time_ms: u64 },
    /// Select control released
    SelectEnd { time_ms: u64 },
}

impl RawInput {
    /// Timestamp in milliseconds
    pub fn time_ms(&self) -> u64 {
        match *self {
            RawInput::TouchDown { time_ms, .. }
            | RawInput::TouchMotion { time_ms, .. }
            | RawInput::TouchUp { time_ms, .. }
            | RawInput::TouchCancel { time_ms, .. }
            | RawInput::SelectStart { time_ms }
            | RawInput::SelectEnd { time_ms } => time_ms,
        }
    }
}

/// Abstract input primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// A contact landed at `point`
    Press { point: Vec2 },
    /// One or more contacts moved
    Move,
    /// A contact lifted
    Release,
}

/// A primitive plus the contact set after it was applied
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub primitive: Primitive,
    /// Active contact points, ordered by contact id
    pub contacts: Vec<Vec2>,
    pub at: Duration,
}

impl InputEvent {
    /// Number of contacts currently down
    pub fn press_count(&self) -> usize {
        self.contacts.len()
    }

    /// Midpoint of the first two contacts
    pub fn midpoint(&self) -> Option<Vec2> {
        match self.contacts.as_slice() {
            [a, b, ..] => Some((*a + *b) * 0.5),
            _ => None,
        }
    }

    /// First contact point
    pub fn primary(&self) -> Option<Vec2> {
        self.contacts.first().copied()
    }
}
