//! Guided tutorial stages.
//!
//! Stages unlock controls one group at a time:
//!
//! | Stage | Unlocked | Leaves when |
//! |-------|----------|-------------|
//! | 0 | pause, reset, ghost toggle | Advance pressed |
//! | 1 | + translation | Advance pressed |
//! | 2 | + rotation (blocked rotations raise a hint) | Advance pressed |
//! | 3 | + camera rotation | 9 s after the camera first moved |
//! | 4 | + manual descent (no gravity) | never |

use crate::types::{BlockedRotation, TUTORIAL_HINT_S};

pub const LAST_STAGE: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tutorial {
    stage: u8,
    /// Fade-in of the stage text, `0.0..=1.0`.
    text_alpha: f32,
    /// Remaining time of the blocked-rotation hint (stage 2), or the
    /// wait after the first camera move (stage 3).
    hint_timer: f32,
    /// Stage 3: how long the "moves are camera relative" note has been shown.
    note_timer: f32,
    view_rotated: bool,
    blocked: Option<BlockedRotation>,
}

impl Tutorial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current stage
    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn text_alpha(&self) -> f32 {
        self.text_alpha
    }

    /// Blocked rotation to explain and its fade, while the hint is up.
    pub fn blocked_hint(&self) -> Option<(BlockedRotation, f32)> {
        if self.stage != 2 {
            return None;
        }
        self.blocked
            .filter(|_| self.hint_timer > 0.0)
            .map(|b| (b, self.hint_timer.min(1.0)))
    }

    /// Fade of the stage 3 closing note, once it is showing.
    pub fn camera_note(&self) -> Option<f32> {
        (self.stage == 3 && self.note_timer > 0.0).then(|| self.note_timer.min(1.0))
    }

    pub fn allows_translation(&self) -> bool {
        self.stage >= 1
    }

    pub fn allows_rotation(&self) -> bool {
        self.stage >= 2
    }

    pub fn allows_view_rotation(&self) -> bool {
        self.stage >= 3
    }

    pub fn allows_descent(&self) -> bool {
        self.stage >= LAST_STAGE
    }

    fn next_stage(&mut self) {
        let stage = (self.stage + 1).min(LAST_STAGE);
        *self = Tutorial {
            stage,
            ..Tutorial::default()
        };
        log::debug!("tutorial stage {stage}");
    }

    /// Start-of-update timers.
    pub fn tick(&mut self, dt: f32) {
        self.text_alpha = (self.text_alpha + dt).min(1.0);
    }

    /// End-of-update timers and timed transitions.
    pub fn settle(&mut self, dt: f32) {
        match self.stage {
            2 => self.hint_timer = (self.hint_timer - dt).max(0.0),
            3 if self.view_rotated => {
                self.hint_timer += dt;
                if self.hint_timer > TUTORIAL_HINT_S {
                    self.note_timer += dt;
                    if self.note_timer > TUTORIAL_HINT_S {
                        self.next_stage();
                    }
                }
            }
            _ => {}
        }
    }

    /// Advance key pressed. Returns true if the stage changed.
    pub fn advance(&mut self) -> bool {
        if self.stage <= 2 {
            self.next_stage();
            true
        } else {
            false
        }
    }

    pub fn rotation_blocked(&mut self, which: BlockedRotation) {
        if self.stage == 2 {
            self.blocked = Some(which);
            self.hint_timer = TUTORIAL_HINT_S;
        }
    }

    pub fn view_rotated(&mut self) {
        if self.stage == 3 {
            self.view_rotated = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_first_three_stages() {
        let mut t = Tutorial::new();
        assert!(!t.allows_translation());
        assert!(t.advance());
        assert!(t.allows_translation() && !t.allows_rotation());
        assert!(t.advance());
        assert!(t.allows_rotation());
        assert!(t.advance());
        assert_eq!(t.stage(), 3);
        assert!(!t.advance());
    }

    #[test]
    fn blocked_hint_fades_out() {
        let mut t = Tutorial::new();
        t.advance();
        t.advance();
        t.rotation_blocked(BlockedRotation::YawCw);
        assert_eq!(t.blocked_hint(), Some((BlockedRotation::YawCw, 1.0)));
        t.settle(TUTORIAL_HINT_S + 0.1);
        assert_eq!(t.blocked_hint(), None);
    }

    #[test]
    fn camera_stage_needs_rotation_then_waits() {
        let mut t = Tutorial::new();
        for _ in 0..3 {
            t.advance();
        }
        for _ in 0..1000 {
            t.settle(0.1);
        }
        assert_eq!(t.stage(), 3);

        t.view_rotated();
        let mut elapsed = 0.0;
        while t.stage() == 3 {
            t.settle(0.1);
            elapsed += 0.1;
            assert!(elapsed < 10.0);
        }
        assert!(elapsed > 2.0 * TUTORIAL_HINT_S);
        assert!(t.allows_descent());
    }
}
