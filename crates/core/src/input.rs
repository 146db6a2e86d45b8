//! Per-key press/hold/repeat tracking.
//!
//! The host exposes raw "is this key down" state through [`KeyState`]. Once
//! per update the game folds that into a [`KeyTracker`] per logical key, which
//! turns levels into edges (pressed, released) and auto-repeat pulses.

use crate::types::{GameKey, AUTO_REPEAT_DELAY_S, AUTO_REPEAT_INTERVAL_S};

/// Source of raw key levels.
pub trait KeyState {
    fn is_held(&self, key: GameKey) -> bool;
}

/// No key is ever held.
impl KeyState for () {
    fn is_held(&self, _key: GameKey) -> bool {
        false
    }
}

/// Held keys listed in a slice.
impl KeyState for [GameKey] {
    fn is_held(&self, key: GameKey) -> bool {
        self.contains(&key)
    }
}

impl<const N: usize> KeyState for [GameKey; N] {
    fn is_held(&self, key: GameKey) -> bool {
        self.contains(&key)
    }
}

impl<T: KeyState + ?Sized> KeyState for &T {
    fn is_held(&self, key: GameKey) -> bool {
        (**self).is_held(key)
    }
}

/// Edge and repeat state of one key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyTracker {
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
    /// True on the updates where a held key emits a repeat.
    pub auto_repeat: bool,
    hold_time: f32,
    repeat_timer: f32,
}

impl KeyTracker {
    /// Fold one update of raw key level into the tracker.
    pub fn update(&mut self, down: bool, dt: f32) {
        if down {
            self.pressed = !self.held;
            self.held = true;
            self.released = false;
            self.hold_time += dt;
            if self.hold_time > AUTO_REPEAT_DELAY_S {
                self.repeat_timer -= dt;
                if self.repeat_timer < 0.0 {
                    self.repeat_timer += AUTO_REPEAT_INTERVAL_S;
                    self.auto_repeat = true;
                } else {
                    self.auto_repeat = false;
                }
            }
        } else {
            self.released = self.held;
            self.pressed = false;
            self.held = false;
            self.auto_repeat = false;
            self.hold_time = 0.0;
            self.repeat_timer = 0.0;
        }
    }

    /// Pressed this update, or repeating.
    pub fn fired(&self) -> bool {
        self.pressed || self.auto_repeat
    }

    /// Re-arm: a key already down is treated as held, not freshly pressed.
    pub fn rearm(&mut self, down: bool) {
        *self = KeyTracker {
            held: down,
            ..KeyTracker::default()
        };
    }
}

/// Trackers for every logical key.
#[derive(Debug, Clone, Default)]
pub struct KeyTrackers {
    keys: [KeyTracker; GameKey::COUNT],
}

impl KeyTrackers {
    pub fn update<K: KeyState + ?Sized>(&mut self, keys: &K, dt: f32) {
        for key in GameKey::ALL {
            self.keys[key.index()].update(keys.is_held(key), dt);
        }
    }

    pub fn rearm<K: KeyState + ?Sized>(&mut self, keys: &K) {
        for key in GameKey::ALL {
            self.keys[key.index()].rearm(keys.is_held(key));
        }
    }

    pub fn get(&self, key: GameKey) -> &KeyTracker {
        &self.keys[key.index()]
    }

    pub fn pressed(&self, key: GameKey) -> bool {
        self.keys[key.index()].pressed
    }

    pub fn held(&self, key: GameKey) -> bool {
        self.keys[key.index()].held
    }

    pub fn fired(&self, key: GameKey) -> bool {
        self.keys[key.index()].fired()
    }

    /// Force a press, as gravity does for Down.
    pub fn force_press(&mut self, key: GameKey) {
        self.keys[key.index()].pressed = true;
    }

    /// Swallow a press so later checks in the same update ignore it.
    pub fn consume_press(&mut self, key: GameKey) {
        self.keys[key.index()].pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    #[test]
    fn press_is_a_single_edge() {
        let mut k = KeyTracker::default();
        k.update(true, DT);
        assert!(k.pressed && k.held);
        k.update(true, DT);
        assert!(!k.pressed && k.held);
        k.update(false, DT);
        assert!(k.released && !k.held);
        k.update(false, DT);
        assert!(!k.released);
    }

    #[test]
    fn repeat_starts_after_delay_then_every_interval() {
        let mut k = KeyTracker::default();
        let mut repeats = Vec::new();
        let mut t = 0.0;
        while t < 0.75 {
            k.update(true, 0.01);
            t += 0.01;
            if k.auto_repeat {
                repeats.push(t);
            }
        }
        assert!(repeats[0] > AUTO_REPEAT_DELAY_S && repeats[0] < AUTO_REPEAT_DELAY_S + 0.02);
        // 0.3..0.75 with a 0.1 interval: first repeat plus four more.
        assert_eq!(repeats.len(), 5);
    }

    #[test]
    fn rearm_treats_down_keys_as_held() {
        let mut trackers = KeyTrackers::default();
        trackers.rearm(&[GameKey::Down]);
        trackers.update(&[GameKey::Down], DT);
        assert!(!trackers.pressed(GameKey::Down));
        assert!(trackers.held(GameKey::Down));
    }
}
