//! Game state module - the drop state machine
//!
//! Ties together the grid, the falling piece, the next-piece slot and the
//! score. Each call to [`GameState::update`] reads key state once, applies
//! gravity and player input, and returns `false` when the game stopped
//! (paused or over). The host then reads the event with
//! [`GameState::take_event`].
//!
//! ```text
//! Falling --blocked below--> Locking --place/score--> Spawning --> Falling
//!    |                          (over roof)
//!    +--------------------------------------------> GameOver
//! ```

use glam::{IVec2, IVec3};

use crate::grid::VoxelGrid;
use crate::input::{KeyState, KeyTrackers};
use crate::piece::{spawn_position, ArchetypeRegistry, Piece};
use crate::progress::GameProgress;
use crate::rng::NextPiece;
use crate::snapshot::{GameSnapshot, TutorialSnapshot};
use crate::tutorial::Tutorial;
use crate::types::{
    Axis, BlockedRotation, GameEvent, GameKey, BASE_GRAVITY_SPEED, PREVIEW_SPIN_PERIOD_S,
    SOFT_DROP_BOOST,
};

const TAU: f32 = std::f32::consts::TAU;

/// Drop state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropState {
    Falling,
    Locking,
    Spawning,
    Paused,
    GameOver,
}

/// Outcome of one downward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Moved,
    /// Locked and respawned; carries the number of cleared layers.
    Locked(u32),
    GameOver,
}

/// Complete game state.
#[derive(Debug, Clone)]
pub struct GameState {
    registry: ArchetypeRegistry,
    grid: VoxelGrid,
    piece: Piece,
    next: NextPiece,
    current: GameProgress,
    best: GameProgress,
    gravity_speed: f32,
    gravity_timer: f32,
    show_ghost: bool,
    state: DropState,
    keys: KeyTrackers,
    tutorial: Option<Tutorial>,
    /// Spin of the next-piece preview in radians.
    preview_yaw: f32,
    last_event: Option<GameEvent>,
}

impl GameState {
    /// Create a game on a grid of `dims` and spawn the first piece.
    pub fn new(dims: IVec3, seed: u32) -> Self {
        let registry = ArchetypeRegistry::new();
        let grid = VoxelGrid::new(dims);
        let mut next = NextPiece::new(seed);
        let piece = Piece::new(&registry, next.take(), &grid);
        Self {
            registry,
            grid,
            piece,
            next,
            current: GameProgress::default(),
            best: GameProgress::default(),
            gravity_speed: BASE_GRAVITY_SPEED,
            gravity_timer: 0.0,
            show_ghost: true,
            state: DropState::Falling,
            keys: KeyTrackers::default(),
            tutorial: None,
            preview_yaw: 0.0,
            last_event: None,
        }
    }

    /// Get the play field
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut VoxelGrid {
        &mut self.grid
    }

    /// Get the falling piece
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn piece_mut(&mut self) -> &mut Piece {
        &mut self.piece
    }

    pub fn registry(&self) -> &ArchetypeRegistry {
        &self.registry
    }

    /// Get current game progress
    pub fn progress(&self) -> GameProgress {
        self.current
    }

    /// Get best recorded game
    pub fn best(&self) -> GameProgress {
        self.best
    }

    /// Seed the best record, typically from disk at startup.
    pub fn set_best(&mut self, best: GameProgress) {
        self.best = best;
    }

    /// Best record including the game in progress.
    pub fn best_including_current(&self) -> GameProgress {
        if self.current.score > self.best.score {
            self.current
        } else {
            self.best
        }
    }

    pub fn state(&self) -> DropState {
        self.state
    }

    pub fn paused(&self) -> bool {
        self.state == DropState::Paused
    }

    pub fn game_over(&self) -> bool {
        self.state == DropState::GameOver
    }

    pub fn gravity_speed(&self) -> f32 {
        self.gravity_speed
    }

    pub fn show_ghost(&self) -> bool {
        self.show_ghost
    }

    pub fn set_show_ghost(&mut self, show: bool) {
        self.show_ghost = show;
    }

    /// Archetype shown in the next-piece preview
    pub fn next_archetype(&self) -> usize {
        self.next.peek()
    }

    pub fn preview_yaw(&self) -> f32 {
        self.preview_yaw
    }

    pub fn tutorial(&self) -> Option<&Tutorial> {
        self.tutorial.as_ref()
    }

    /// Take the last event, if any.
    pub fn take_event(&mut self) -> Option<GameEvent> {
        self.last_event.take()
    }

    /// Advance the game by `dt` seconds.
    ///
    /// Returns `false` once the game is paused or over; the matching event is
    /// available from [`GameState::take_event`].
    pub fn update<K: KeyState + ?Sized>(&mut self, dt: f32, keys: &K) -> bool {
        if matches!(self.state, DropState::Paused | DropState::GameOver) {
            return false;
        }
        self.keys.update(keys, dt);

        let running = if self.tutorial.is_some() {
            self.update_tutorial(dt)
        } else {
            self.update_play(dt)
        };
        if !running {
            return false;
        }

        self.preview_yaw += dt / PREVIEW_SPIN_PERIOD_S * TAU;
        while self.preview_yaw >= TAU {
            self.preview_yaw -= TAU;
        }
        true
    }

    /// Pause, reset and ghost keys. Returns false if the game paused.
    fn handle_meta_keys(&mut self) -> bool {
        if self.keys.pressed(GameKey::Pause) {
            self.pause();
            return false;
        }
        if self.keys.pressed(GameKey::Reset) {
            if self.tutorial.is_some() {
                self.reset();
                self.start_tutorial();
            } else {
                self.reset();
            }
        }
        if self.keys.pressed(GameKey::ToggleGhost) {
            self.show_ghost = !self.show_ghost;
        }
        true
    }

    fn update_play(&mut self, dt: f32) -> bool {
        if !self.handle_meta_keys() {
            return false;
        }

        self.gravity_timer += dt;
        let boost = if self.keys.held(GameKey::Down) { SOFT_DROP_BOOST } else { 0.0 };
        if self.gravity_timer > 1.0 / (self.gravity_speed + boost) {
            self.gravity_timer = 0.0;
            self.keys.force_press(GameKey::Down);
        }
        if self.keys.pressed(GameKey::Down) && self.step_down() == StepResult::GameOver {
            return false;
        }

        self.handle_rotation();
        self.handle_translation();
        true
    }

    fn update_tutorial(&mut self, dt: f32) -> bool {
        if let Some(t) = self.tutorial.as_mut() {
            t.tick(dt);
            if t.stage() == 0 && self.keys.pressed(GameKey::Advance) {
                t.advance();
                self.keys.consume_press(GameKey::Advance);
            }
        }

        if !self.handle_meta_keys() {
            return false;
        }
        let Some(t) = self.tutorial.as_ref() else {
            return true;
        };
        let (descent, rotation, translation) =
            (t.allows_descent(), t.allows_rotation(), t.allows_translation());

        if descent && self.keys.fired(GameKey::Down) && self.step_down() == StepResult::GameOver {
            return false;
        }

        if rotation {
            if let Some(blocked) = self.handle_rotation() {
                if let Some(t) = self.tutorial.as_mut() {
                    t.rotation_blocked(blocked);
                }
            }
            if self.tutorial_stage() == Some(2) && self.keys.pressed(GameKey::Advance) {
                self.advance_tutorial();
            }
        }

        if translation {
            self.handle_translation();
            if self.tutorial_stage() == Some(1) && self.keys.pressed(GameKey::Advance) {
                self.advance_tutorial();
            }
        }

        if let Some(t) = self.tutorial.as_mut() {
            t.settle(dt);
        }
        true
    }

    fn tutorial_stage(&self) -> Option<u8> {
        self.tutorial.as_ref().map(Tutorial::stage)
    }

    fn advance_tutorial(&mut self) {
        if let Some(t) = self.tutorial.as_mut() {
            t.advance();
        }
        self.keys.consume_press(GameKey::Advance);
    }

    /// Move the piece down one layer, locking it when blocked.
    pub fn step_down(&mut self) -> StepResult {
        let shape = *self.piece.shape();
        let below = self.piece.position() - IVec3::Y;
        if !self.grid.test_placement(&shape, below).collides() {
            self.piece.set_position(below);
            return StepResult::Moved;
        }

        if self.grid.test_placement(&shape, self.piece.position()).over_roof() {
            self.state = DropState::GameOver;
            self.last_event = Some(GameEvent::GameOver);
            log::info!(
                "game over: score {} after {} pieces",
                self.current.score,
                self.current.pieces_locked
            );
            return StepResult::GameOver;
        }

        self.state = DropState::Locking;
        let cleared = self.lock_piece();
        self.state = DropState::Spawning;
        self.spawn_piece();
        self.state = DropState::Falling;
        StepResult::Locked(cleared)
    }

    /// Write the piece into the grid and account for it. Returns cleared layers.
    fn lock_piece(&mut self) -> u32 {
        let cleared = self.grid.place(
            self.piece.archetype(),
            self.piece.shape(),
            self.piece.position(),
        );
        let points = self.current.record_lock(cleared, self.grid.layer_area());
        self.gravity_speed = self.current.gravity_speed();
        log::debug!(
            "locked archetype {} at {}: {} layer(s), +{} points",
            self.piece.archetype(),
            self.piece.position(),
            cleared,
            points
        );
        cleared
    }

    /// Replace the piece with the previewed archetype at the spawn position.
    pub fn spawn_piece(&mut self) {
        let archetype = self.next.take();
        self.piece.reset(&self.registry, archetype);
        self.piece.set_position(spawn_position(&self.grid));
    }

    /// Try a rotation, applying it only if it does not collide.
    ///
    /// Each entry of `turns` is applied in order, as one move.
    pub fn try_rotate(&mut self, turns: &[(Axis, i32)]) -> bool {
        let mut shape = *self.piece.shape();
        for &(axis, n) in turns {
            crate::piece::rotate_shape(&mut shape, axis, n);
        }
        if self
            .grid
            .test_placement(&shape, self.piece.position())
            .collides()
        {
            return false;
        }
        for &(axis, n) in turns {
            self.piece.rotate(axis, n);
        }
        true
    }

    /// Try a translation, applying it only if it does not collide.
    pub fn try_move(&mut self, delta: IVec3) -> bool {
        let target = self.piece.position() + delta;
        if self
            .grid
            .test_placement(self.piece.shape(), target)
            .collides()
        {
            return false;
        }
        self.piece.set_position(target);
        true
    }

    /// Apply at most one rotation key. Returns the rotation if it was blocked.
    fn handle_rotation(&mut self) -> Option<BlockedRotation> {
        let v = self.grid.unit_y_vector();
        let (turns, which): ([(Axis, i32); 2], BlockedRotation) =
            if self.keys.pressed(GameKey::RotateCw) {
                ([(Axis::Z, -v.x), (Axis::X, v.y)], BlockedRotation::Cw)
            } else if self.keys.pressed(GameKey::RotateCcw) {
                ([(Axis::Z, v.x), (Axis::X, -v.y)], BlockedRotation::Ccw)
            } else if self.keys.pressed(GameKey::RotateYawCw) {
                ([(Axis::Y, 1), (Axis::Y, 0)], BlockedRotation::YawCw)
            } else if self.keys.pressed(GameKey::RotateYawCcw) {
                ([(Axis::Y, -1), (Axis::Y, 0)], BlockedRotation::YawCcw)
            } else {
                return None;
            };
        if self.try_rotate(&turns) {
            None
        } else {
            Some(which)
        }
    }

    /// Camera-relative translation: push/pull and right/left, each pair exclusive.
    fn handle_translation(&mut self) {
        let v: IVec2 = self.grid.unit_y_vector();
        if self.keys.fired(GameKey::Push) {
            self.try_move(IVec3::new(-v.y, 0, v.x));
        } else if self.keys.fired(GameKey::Pull) {
            self.try_move(IVec3::new(v.y, 0, -v.x));
        }
        if self.keys.fired(GameKey::Right) {
            self.try_move(IVec3::new(v.x, 0, v.y));
        } else if self.keys.fired(GameKey::Left) {
            self.try_move(IVec3::new(-v.x, 0, -v.y));
        }
    }

    /// Rotate the camera. Ignored during the early tutorial stages.
    pub fn rotate_view(&mut self, dyaw: f32, dpitch: f32) -> bool {
        if let Some(t) = self.tutorial.as_mut() {
            if !t.allows_view_rotation() {
                return false;
            }
            t.view_rotated();
        }
        self.grid.rotate_view(dyaw, dpitch);
        true
    }

    /// Pause the game and emit [`GameEvent::Pause`].
    pub fn pause(&mut self) {
        if self.state == DropState::GameOver {
            return;
        }
        self.state = DropState::Paused;
        self.last_event = Some(GameEvent::Pause);
    }

    /// Leave the paused state. Keys already down count as held, not pressed.
    pub fn resume<K: KeyState + ?Sized>(&mut self, keys: &K) {
        self.keys.rearm(keys);
        if self.state == DropState::Paused {
            self.state = DropState::Falling;
        }
        self.last_event = Some(GameEvent::Resume);
    }

    /// Start a new game, promoting the finished score to best if higher.
    pub fn reset(&mut self) {
        self.tutorial = None;
        self.grid.reset_view();
        self.grid.clear();
        if self.current.score > self.best.score {
            log::info!("new best score {}", self.current.score);
            self.best = self.current;
        }
        self.current = GameProgress::default();
        self.gravity_speed = BASE_GRAVITY_SPEED;
        self.gravity_timer = 0.0;
        self.spawn_piece();
        self.state = DropState::Falling;
        log::info!("new game on {} grid", self.grid.dims());
    }

    /// Enter the tutorial on the current game, with the piece lowered to mid height.
    pub fn start_tutorial(&mut self) {
        self.tutorial = Some(Tutorial::new());
        let p = self.piece.position();
        self.piece
            .set_position(IVec3::new(p.x, self.grid.height() / 2, p.z));
    }

    /// Resize the grid and start a new game.
    pub fn resize(&mut self, dims: IVec3) {
        self.grid.resize(dims);
        self.reset();
    }

    /// Fill an existing snapshot without reallocating.
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.score = self.current.score;
        out.best = self.best.score;
        out.pieces_locked = self.current.pieces_locked;
        out.level = self.current.level();
        out.level_progress = self.current.level_progress();
        out.next_archetype = self.next.peek();
        out.show_ghost = self.show_ghost;
        out.paused = self.paused();
        out.game_over = self.game_over();
        out.tutorial = self.tutorial.as_ref().map(TutorialSnapshot::from);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut out = GameSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }
}

impl Default for GameState {
    fn default() -> Self {
        let [x, y, z] = crate::types::DEFAULT_GRID_DIMS;
        Self::new(IVec3::new(x, y, z), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameKey;

    const DT: f32 = 0.016;

    fn game() -> GameState {
        GameState::new(IVec3::new(4, 10, 4), 3)
    }

    #[test]
    fn new_game_spawns_above_roof() {
        let g = game();
        assert_eq!(g.piece().position(), IVec3::new(2, 12, 2));
        assert_eq!(g.state(), DropState::Falling);
        assert_eq!(g.gravity_speed(), 1.0);
    }

    #[test]
    fn gravity_steps_once_per_second_at_level_one() {
        let mut g = game();
        let y0 = g.piece().position().y;
        for _ in 0..70 {
            assert!(g.update(DT, &()));
        }
        assert_eq!(g.piece().position().y, y0 - 1);
    }

    #[test]
    fn held_down_speeds_up_gravity() {
        let mut g = game();
        let y0 = g.piece().position().y;
        // One press step plus 8 steps per second while held.
        for _ in 0..30 {
            g.update(DT, &[GameKey::Down]);
        }
        assert!(g.piece().position().y <= y0 - 4);
    }

    #[test]
    fn pause_stops_updates_and_emits_event() {
        let mut g = game();
        assert!(!g.update(DT, &[GameKey::Pause]));
        assert_eq!(g.take_event(), Some(GameEvent::Pause));
        assert!(!g.update(DT, &()));

        g.resume(&[GameKey::Pause]);
        assert_eq!(g.take_event(), Some(GameEvent::Resume));
        // Still held from before the pause: not a new press.
        assert!(g.update(DT, &[GameKey::Pause]));
    }

    #[test]
    fn blocked_moves_are_rejected_in_place() {
        let mut g = game();
        for _ in 0..10 {
            g.try_move(IVec3::X);
        }
        let x = g.piece().position().x;
        assert!(!g.try_move(IVec3::X));
        assert_eq!(g.piece().position().x, x);
    }

    #[test]
    fn toggle_ghost_flips_on_press_only() {
        let mut g = game();
        assert!(g.show_ghost());
        g.update(DT, &[GameKey::ToggleGhost]);
        g.update(DT, &[GameKey::ToggleGhost]);
        assert!(!g.show_ghost());
    }

    #[test]
    fn reset_promotes_best_and_clears_progress() {
        let mut g = game();
        g.current.score = 48;
        g.current.pieces_locked = 12;
        g.reset();
        assert_eq!(g.best().score, 48);
        assert_eq!(g.progress(), GameProgress::default());
        assert_eq!(g.gravity_speed(), 1.0);
        assert!(g.grid().cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn view_rotation_gated_in_tutorial() {
        let mut g = game();
        g.start_tutorial();
        assert_eq!(g.piece().position().y, 5);
        assert!(!g.rotate_view(0.3, 0.0));
        assert_eq!(g.grid().yaw(), 0.0);
    }

    #[test]
    fn tutorial_advance_moves_one_stage_per_press() {
        let mut g = game();
        g.start_tutorial();
        g.update(DT, &[GameKey::Advance]);
        assert_eq!(g.tutorial().map(Tutorial::stage), Some(1));
        g.update(DT, &());
        g.update(DT, &[GameKey::Advance]);
        assert_eq!(g.tutorial().map(Tutorial::stage), Some(2));
    }

    #[test]
    fn tutorial_has_no_gravity() {
        let mut g = game();
        g.start_tutorial();
        let y0 = g.piece().position().y;
        for _ in 0..200 {
            g.update(DT, &());
        }
        assert_eq!(g.piece().position().y, y0);
    }
}
