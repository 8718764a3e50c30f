//! Gesture scripts
//!
//! A script is a TOML document holding the camera, the floor the probe
//! reports and an ordered list of steps. Steps carry no timestamps: the
//! replay clock only moves on `wait`, and every raw event is stamped with
//! the current clock.
//!
//! ```toml
//! floor = [0.0, 0.0, -1.5]
//!
//! [camera]
//! eye = [0.0, 1.5, 0.0]
//! target = [0.0, 0.0, -1.5]
//!
//! [[step]]
//! do = "down"
//! id = 0
//! x = 540.0
//! y = 960.0
//!
//! [[step]]
//! do = "wait"
//! ms = 600
//!
//! [[step]]
//! do = "up"
//! id = 0
//! ```

use std::path::Path;

use furnish_input::RawInput;
use furnish_scene::CameraView;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ScriptError, ScriptResult};

const WALKTHROUGH: &str = include_str!("../scripts/walkthrough.toml");

/// Camera the whole replay is viewed through
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub viewport: [f32; 2],
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            eye: [0.0, 1.5, 0.0],
            target: [0.0, 0.0, -1.5],
            viewport: [1080.0, 1920.0],
        }
    }
}

impl CameraSpec {
    pub fn view(&self) -> CameraView {
        CameraView::look_at(
            Vec3::from(self.eye),
            Vec3::from(self.target),
            Vec2::from(self.viewport),
        )
    }
}

/// One script step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "do", rename_all = "snake_case")]
pub enum Step {
    Down { id: u64, x: f32, y: f32 },
    Move { id: u64, x: f32, y: f32 },
    Up { id: u64 },
    Cancel { id: u64 },
    SelectStart,
    SelectEnd,
    /// Run frames for `ms` milliseconds
    Wait { ms: u64 },
    /// Move the floor the probe reports
    Floor { x: f32, y: f32, z: f32 },
    /// Probe stops finding a surface
    LoseFloor,
    /// Pick the model placed by the next double tap
    Choose { model: usize },
    End,
    Restart,
}

impl Step {
    /// Raw input for this step, stamped with `time_ms`
    pub fn raw(&self, time_ms: u64) -> Option<RawInput> {
        let raw = match *self {
            Step::Down { id, x, y } => RawInput::TouchDown { id, x, y, time_ms },
            Step::Move { id, x, y } => RawInput::TouchMotion { id, x, y, time_ms },
            Step::Up { id } => RawInput::TouchUp { id, time_ms },
            Step::Cancel { id } => RawInput::TouchCancel { id, time_ms },
            Step::SelectStart => RawInput::SelectStart { time_ms },
            Step::SelectEnd => RawInput::SelectEnd { time_ms },
            _ => return None,
        };
        Some(raw)
    }
}

fn default_floor() -> [f32; 3] {
    [0.0, 0.0, -1.5]
}

fn default_model_size() -> [f32; 3] {
    [50.0, 90.0, 50.0]
}

/// A replayable session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Floor position reported by the probe until a `floor` step moves it
    #[serde(default = "default_floor")]
    pub floor: [f32; 3],
    /// Box dimensions given to every catalog model, in model units
    #[serde(default = "default_model_size")]
    pub model_size: [f32; 3],
    #[serde(default)]
    pub camera: CameraSpec,
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_toml_str(source: &str) -> ScriptResult<Self> {
        let script: Self = toml::from_str(source)?;
        if script.steps.is_empty() {
            return Err(ScriptError::Empty);
        }
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> ScriptResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Built-in walkthrough: place, rotate, select and delete
    pub fn walkthrough() -> ScriptResult<Self> {
        Self::from_toml_str(WALKTHROUGH)
    }

    /// Total time the script waits, in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Wait { ms } => *ms,
                _ => 0,
            })
            .sum()
    }
}
