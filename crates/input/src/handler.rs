//! Held-key tracking for terminal environments.
//!
//! The game polls key levels once per update through [`KeyState`]. Terminals
//! deliver edges instead, and many never send release events, so a key that
//! has not been seen for a short timeout is treated as released.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use crate::core::KeyState;
use crate::types::GameKey;

// A tap would otherwise stay "held" until the next event, firing auto-repeat
// and soft drop. Terminal auto-repeat refreshes a genuinely held key.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

/// Keys currently held, with the time each was last seen.
#[derive(Debug, Clone)]
pub struct InputHandler {
    held: ArrayVec<(GameKey, Instant), { GameKey::COUNT }>,
    release_timeout: Duration,
    /// Terminal reports releases; the timeout is not applied.
    release_events: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            held: ArrayVec::new(),
            release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
            release_events: false,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.release_timeout = Duration::from_millis(timeout_ms);
        self
    }

    /// Rely on real release events instead of the timeout.
    pub fn with_release_events(mut self, enabled: bool) -> Self {
        self.release_events = enabled;
        self
    }

    /// Record a press or terminal repeat of `key` at `now`.
    pub fn handle_key_press(&mut self, key: GameKey, now: Instant) {
        if let Some(entry) = self.held.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = now;
            return;
        }
        // Capacity equals the number of logical keys, so this never overflows.
        let _ = self.held.try_push((key, now));
    }

    pub fn handle_key_release(&mut self, key: GameKey) {
        self.held.retain(|(k, _)| *k != key);
    }

    /// Release keys not seen within the timeout.
    pub fn update(&mut self, now: Instant) {
        if self.release_events {
            return;
        }
        let timeout = self.release_timeout;
        self.held
            .retain(|(_, seen)| now.saturating_duration_since(*seen) <= timeout);
    }

    pub fn held_keys(&self) -> impl Iterator<Item = GameKey> + '_ {
        self.held.iter().map(|(k, _)| *k)
    }

    pub fn reset(&mut self) {
        self.held.clear();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyState for InputHandler {
    fn is_held(&self, key: GameKey) -> bool {
        self.held.iter().any(|(k, _)| *k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_then_release() {
        let mut ih = InputHandler::new();
        let t0 = Instant::now();
        ih.handle_key_press(GameKey::Left, t0);
        assert!(ih.is_held(GameKey::Left));
        assert!(!ih.is_held(GameKey::Right));

        ih.handle_key_release(GameKey::Left);
        assert!(!ih.is_held(GameKey::Left));
    }

    #[test]
    fn test_auto_release_after_timeout_without_key_release_events() {
        let mut ih = InputHandler::new().with_key_release_timeout_ms(50);
        let t0 = Instant::now();
        ih.handle_key_press(GameKey::Down, t0);

        ih.update(t0 + Duration::from_millis(50));
        assert!(ih.is_held(GameKey::Down));

        ih.update(t0 + Duration::from_millis(51));
        assert!(!ih.is_held(GameKey::Down));
    }

    #[test]
    fn test_terminal_repeat_keeps_key_held() {
        let mut ih = InputHandler::new().with_key_release_timeout_ms(50);
        let t0 = Instant::now();
        for step in 0..10 {
            let now = t0 + Duration::from_millis(step * 40);
            ih.handle_key_press(GameKey::Push, now);
            ih.update(now);
        }
        assert!(ih.is_held(GameKey::Push));
        assert_eq!(ih.held_keys().count(), 1);
    }

    #[test]
    fn test_other_key_does_not_extend_stale_key() {
        let mut ih = InputHandler::new().with_key_release_timeout_ms(50);
        let t0 = Instant::now();
        ih.handle_key_press(GameKey::Left, t0);
        let later = t0 + Duration::from_millis(51);
        ih.handle_key_press(GameKey::RotateCw, later);
        ih.update(later);
        assert!(!ih.is_held(GameKey::Left));
        assert!(ih.is_held(GameKey::RotateCw));
    }

    #[test]
    fn test_release_events_disable_timeout() {
        let mut ih = InputHandler::new()
            .with_key_release_timeout_ms(10)
            .with_release_events(true);
        let t0 = Instant::now();
        ih.handle_key_press(GameKey::Down, t0);
        ih.update(t0 + Duration::from_secs(5));
        assert!(ih.is_held(GameKey::Down));
    }

    #[test]
    fn test_reset_clears_held_state() {
        let mut ih = InputHandler::new();
        let t0 = Instant::now();
        for key in GameKey::ALL {
            ih.handle_key_press(key, t0);
        }
        assert_eq!(ih.held_keys().count(), GameKey::COUNT);
        ih.reset();
        assert_eq!(ih.held_keys().count(), 0);
    }
}
