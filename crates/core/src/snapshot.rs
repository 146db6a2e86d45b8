use crate::tutorial::Tutorial;
use crate::types::BlockedRotation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TutorialSnapshot {
    pub stage: u8,
    pub text_alpha: f32,
    pub blocked: Option<(BlockedRotation, f32)>,
    pub camera_note: Option<f32>,
}

impl From<&Tutorial> for TutorialSnapshot {
    fn from(t: &Tutorial) -> Self {
        Self {
            stage: t.stage(),
            text_alpha: t.text_alpha(),
            blocked: t.blocked_hint(),
            camera_note: t.camera_note(),
        }
    }
}

/// Everything the side panel and overlays need, without the meshes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GameSnapshot {
    pub score: i32,
    pub best: i32,
    pub pieces_locked: i32,
    pub level: u32,
    pub level_progress: f32,
    pub next_archetype: usize,
    pub show_ghost: bool,
    pub paused: bool,
    pub game_over: bool,
    pub tutorial: Option<TutorialSnapshot>,
}
