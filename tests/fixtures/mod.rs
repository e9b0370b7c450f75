//! Render request fixtures shared by the integration tests

#![allow(dead_code)]

use render_orchestrator::models::render::RenderRequest;
use serde_json::{json, Value};

/// Fixture describing one render submission and the renderer's scripted behaviour
#[derive(Debug, Clone)]
pub struct RenderFixture {
    pub participant: &'static str,
    pub movement: &'static str,
    pub set_type: &'static str,
    pub camera: &'static str,
    pub fps: u32,
    pub save_name: &'static str,
    pub description: &'static str,
}

impl RenderFixture {
    /// Request body as the browser sends it, with `fps` as a JSON number.
    pub fn body(&self) -> Value {
        json!({
            "participant": self.participant,
            "movement": self.movement,
            "setType": self.set_type,
            "camera": self.camera,
            "fps": self.fps,
            "saveName": self.save_name,
        })
    }

    pub fn request(&self) -> RenderRequest {
        serde_json::from_value(self.body()).expect("fixture deserializes")
    }
}

pub const WALK: RenderFixture = RenderFixture {
    participant: "P1",
    movement: "walk",
    set_type: "A",
    camera: "cam1",
    fps: 24,
    save_name: "out1",
    description: "Single participant walking, default camera",
};

pub const JUMP: RenderFixture = RenderFixture {
    participant: "P7",
    movement: "jump",
    set_type: "B",
    camera: "cam3",
    fps: 60,
    save_name: "p7_jump",
    description: "High frame rate jump from the side camera",
};

/// `count` fixtures with distinct participants, hence distinct job IDs.
pub fn distinct_requests(count: usize) -> Vec<RenderRequest> {
    (0..count)
        .map(|n| {
            serde_json::from_value(json!({
                "participant": format!("P{n}"),
                "movement": "walk",
                "setType": "A",
                "camera": "cam1",
                "fps": 30,
                "saveName": format!("batch_{n}"),
            }))
            .expect("fixture deserializes")
        })
        .collect()
}
