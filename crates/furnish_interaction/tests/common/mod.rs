//! Shared session harness: a headless scene, a scripted floor and a clock

#![allow(dead_code)]

use std::time::Duration;

use furnish_interaction::prelude::*;
use furnish_scene::{MemoryScene, ModelAsset, ModelSpec};
use furnish_xr::ScriptedSurfaceProbe;
use glam::{Vec2, Vec3};

pub const VIEWPORT: Vec2 = Vec2::new(1080.0, 1920.0);
pub const FRAME_MS: u64 = 16;

/// Phone held 1.5 m above the floor, looking 45 degrees down
pub fn camera() -> CameraView {
    CameraView::look_at(Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.0, 0.0, -1.5), VIEWPORT)
}

pub fn floor_at(x: f32, z: f32) -> Pose {
    Pose::from_position(Vec3::new(x, 0.0, z))
}

pub struct Harness {
    pub session: ArSession<MemoryScene, ScriptedSurfaceProbe>,
    pub now: u64,
    pub frame_index: u64,
    pub camera: CameraView,
    next_touch: u64,
}

impl Harness {
    /// Session over the default catalog, every model a 50 x 90 x 50 box
    pub fn new() -> Self {
        Self::with_config(InteractionConfig::default(), Vec3::new(50.0, 90.0, 50.0))
    }

    pub fn with_config(config: InteractionConfig, model_size: Vec3) -> Self {
        let mut scene = MemoryScene::new();
        for model in &config.models {
            scene.register_asset(model.name.clone(), ModelAsset::boxed(model_size));
        }
        Self::with_scene(config, scene)
    }

    pub fn with_scene(config: InteractionConfig, scene: MemoryScene) -> Self {
        let mut probe = ScriptedSurfaceProbe::immediate();
        probe.set_pose(floor_at(0.0, -1.5));

        let mut harness = Self {
            session: ArSession::with_scene_loader(config, scene, probe),
            now: 0,
            frame_index: 0,
            camera: camera(),
            next_touch: 0,
        };
        harness.frame();
        harness
    }

    pub fn single_model(name: &str, scale: f32) -> InteractionConfig {
        InteractionConfig {
            models: vec![ModelSpec::new(name, format!("./{}.glb", name), scale)],
            ..InteractionConfig::default()
        }
    }

    pub fn frame(&mut self) -> FrameReport {
        self.frame_index += 1;
        let timing = FrameTiming::at(
            self.frame_index,
            Duration::from_millis(self.now),
            FRAME_MS as f32 / 1000.0,
        );
        self.session.frame(FrameInput::new(timing, self.camera))
    }

    /// Let `ms` of frames elapse, collecting what they resolved
    pub fn advance(&mut self, ms: u64) -> Vec<SessionAction> {
        let end = self.now + ms;
        let mut actions = Vec::new();
        while self.now < end {
            self.now = (self.now + FRAME_MS).min(end);
            actions.extend(self.frame().actions);
        }
        actions
    }

    pub fn input(&mut self, raw: RawInput) -> Vec<SessionAction> {
        self.session.handle_input(raw).into_iter().collect()
    }

    pub fn down(&mut self, point: Vec2) -> (u64, Vec<SessionAction>) {
        let id = self.next_touch;
        self.next_touch += 1;
        let actions = self.input(RawInput::TouchDown {
            id,
            x: point.x,
            y: point.y,
            time_ms: self.now,
        });
        (id, actions)
    }

    /// Press with a caller-chosen contact id
    pub fn down_as(&mut self, id: u64, point: Vec2) -> Vec<SessionAction> {
        self.input(RawInput::TouchDown {
            id,
            x: point.x,
            y: point.y,
            time_ms: self.now,
        })
    }

    pub fn motion(&mut self, id: u64, point: Vec2) -> Vec<SessionAction> {
        self.input(RawInput::TouchMotion {
            id,
            x: point.x,
            y: point.y,
            time_ms: self.now,
        })
    }

    pub fn up(&mut self, id: u64) -> Vec<SessionAction> {
        self.input(RawInput::TouchUp { id, time_ms: self.now })
    }

    pub fn tap(&mut self, point: Vec2) -> Vec<SessionAction> {
        let (id, mut actions) = self.down(point);
        actions.extend(self.advance(50));
        actions.extend(self.up(id));
        actions
    }

    pub fn double_tap(&mut self, point: Vec2) -> Vec<SessionAction> {
        let mut actions = self.tap(point);
        actions.extend(self.advance(100));
        actions.extend(self.tap(point));
        actions
    }

    pub fn hold(&mut self, point: Vec2, ms: u64) -> Vec<SessionAction> {
        let (id, mut actions) = self.down(point);
        actions.extend(self.advance(ms));
        actions.extend(self.up(id));
        actions
    }

    /// Screen position of a world point under the harness camera
    pub fn screen_of(&self, world: Vec3) -> Vec2 {
        self.camera
            .project_to_screen(world)
            .expect("point in front of the camera")
    }

    /// Screen point over the middle of a placed object's bounds
    pub fn screen_of_object(&self, id: ObjectId) -> Vec2 {
        use furnish_scene::SceneGraph;
        let object = self.session.registry().get(id).expect("object placed");
        let bounds = self
            .session
            .scene()
            .world_bounds(object.handle)
            .expect("object has bounds");
        self.screen_of((bounds.min + bounds.max) * 0.5)
    }

    /// A point that sees only floor
    pub fn empty_space(&self) -> Vec2 {
        Vec2::new(100.0, 1800.0)
    }

    pub fn place_at(&mut self, pose: Pose) -> ObjectId {
        self.session.probe_mut().set_pose(pose);
        self.frame();
        let point = self.empty_space();
        match self.double_tap(point).as_slice() {
            [SessionAction::Placed { id, .. }] => *id,
            other => panic!("expected one placement, got {:?}", other),
        }
    }

    pub fn selected_id(&self) -> Option<ObjectId> {
        self.session.selected().map(|o| o.id)
    }
}
