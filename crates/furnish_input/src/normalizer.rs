//! Contact tracking

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;

use crate::event::{InputEvent, Primitive, RawInput};

/// Contact id reserved for the select control
pub const SELECT_CONTACT_ID: u64 = u64::MAX;

/// Turns raw platform events into [`InputEvent`]s.
///
/// Keeps the set of active contacts so every event reports the press
/// count after it was applied.
#[derive(Debug, Clone)]
pub struct InputNormalizer {
    contacts: BTreeMap<u64, Vec2>,
    select_point: Vec2,
}

impl InputNormalizer {
    /// Create a normalizer; the select control presses at `select_point`
    pub fn new(select_point: Vec2) -> Self {
        Self {
            contacts: BTreeMap::new(),
            select_point,
        }
    }

    pub fn set_select_point(&mut self, point: Vec2) {
        self.select_point = point;
    }

    pub fn select_point(&self) -> Vec2 {
        self.select_point
    }

    /// Number of contacts currently down
    pub fn press_count(&self) -> usize {
        self.contacts.len()
    }

    /// Forget every active contact
    pub fn reset(&mut self) {
        self.contacts.clear();
    }

    /// Apply a raw event. Returns None when the event changes nothing.
    pub fn normalize(&mut self, raw: &RawInput) -> Option<InputEvent> {
        let at = Duration::from_millis(raw.time_ms());

        let primitive = match *raw {
            RawInput::TouchDown { id, x, y, .. } => self.down(id, Vec2::new(x, y))?,
            RawInput::TouchMotion { id, x, y, .. } => self.motion(id, Vec2::new(x, y))?,
            RawInput::TouchUp { id, .. } | RawInput::TouchCancel { id, .. } => self.up(id)?,
            RawInput::SelectStart { .. } => self.down(SELECT_CONTACT_ID, self.select_point)?,
            RawInput::SelectEnd { .. } => self.up(SELECT_CONTACT_ID)?,
        };

        Some(InputEvent {
            primitive,
            contacts: self.contacts.values().copied().collect(),
            at,
        })
    }

    fn down(&mut self, id: u64, point: Vec2) -> Option<Primitive> {
        if self.contacts.contains_key(&id) {
            log::debug!("Duplicate down for contact {}, treating as motion", id);
            return self.motion(id, point);
        }
        self.contacts.insert(id, point);
        Some(Primitive::Press { point })
    }

    fn motion(&mut self, id: u64, point: Vec2) -> Option<Primitive> {
        let current = self.contacts.get_mut(&id)?;
        if *current == point {
            return None;
        }
        *current = point;
        Some(Primitive::Move)
    }

    fn up(&mut self, id: u64) -> Option<Primitive> {
        self.contacts.remove(&id).map(|_| Primitive::Release)
    }
}

impl Default for InputNormalizer {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}
