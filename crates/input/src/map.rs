//! Key mapping from terminal events to logical game keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::GameKey;

/// Camera rotation per key event, in radians.
pub const VIEW_STEP: f32 = std::f32::consts::PI / 24.0;

/// What a terminal key does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    /// A logical key, tracked as held until released.
    Key(GameKey),
    /// Rotate the camera once by the given yaw and pitch deltas.
    View { dyaw: f32, dpitch: f32 },
}

/// Map a key code to a logical game key.
pub fn map_key(code: KeyCode) -> Option<GameKey> {
    match code {
        // Translation
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(GameKey::Push),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(GameKey::Pull),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(GameKey::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(GameKey::Right),

        // Rotation
        KeyCode::Char('e') | KeyCode::Char('E') => Some(GameKey::RotateCw),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(GameKey::RotateCcw),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(GameKey::RotateYawCw),
        KeyCode::Char('z') | KeyCode::Char('Z') => Some(GameKey::RotateYawCcw),

        // Descent
        KeyCode::Char(' ') => Some(GameKey::Down),

        // Actions
        KeyCode::Char('p') | KeyCode::Char('P') => Some(GameKey::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameKey::Reset),
        KeyCode::Char('g') | KeyCode::Char('G') => Some(GameKey::ToggleGhost),
        KeyCode::Enter => Some(GameKey::Advance),

        _ => None,
    }
}

/// Map a key code to a camera rotation.
pub fn map_view(code: KeyCode) -> Option<(f32, f32)> {
    match code {
        KeyCode::Char('j') | KeyCode::Char('J') => Some((-VIEW_STEP, 0.0)),
        KeyCode::Char('l') | KeyCode::Char('L') => Some((VIEW_STEP, 0.0)),
        KeyCode::Char('i') | KeyCode::Char('I') => Some((0.0, -VIEW_STEP)),
        KeyCode::Char('k') | KeyCode::Char('K') => Some((0.0, VIEW_STEP)),
        _ => None,
    }
}

/// Map keyboard input to a command.
pub fn handle_key_event(key: KeyEvent) -> Option<InputCommand> {
    if let Some(k) = map_key(key.code) {
        return Some(InputCommand::Key(k));
    }
    map_view(key.code).map(|(dyaw, dpitch)| InputCommand::View { dyaw, dpitch })
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Terminal key name for a logical key, for on-screen hints.
pub fn key_label(key: GameKey) -> &'static str {
    match key {
        GameKey::Push => "W",
        GameKey::Pull => "S",
        GameKey::Left => "A",
        GameKey::Right => "D",
        GameKey::RotateCw => "E",
        GameKey::RotateCcw => "Q",
        GameKey::RotateYawCw => "C",
        GameKey::RotateYawCcw => "Z",
        GameKey::Down => "Space",
        GameKey::Pause => "P",
        GameKey::Reset => "R",
        GameKey::ToggleGhost => "G",
        GameKey::Advance => "Enter",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_movement_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Up)),
            Some(InputCommand::Key(GameKey::Push))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('S'))),
            Some(InputCommand::Key(GameKey::Pull))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(InputCommand::Key(GameKey::Left))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('d'))),
            Some(InputCommand::Key(GameKey::Right))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char(' '))),
            Some(InputCommand::Key(GameKey::Down))
        );
    }

    #[test]
    fn test_rotation_keys() {
        assert_eq!(map_key(KeyCode::Char('e')), Some(GameKey::RotateCw));
        assert_eq!(map_key(KeyCode::Char('Q')), Some(GameKey::RotateCcw));
        assert_eq!(map_key(KeyCode::Char('c')), Some(GameKey::RotateYawCw));
        assert_eq!(map_key(KeyCode::Char('z')), Some(GameKey::RotateYawCcw));
    }

    #[test]
    fn test_view_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('l'))),
            Some(InputCommand::View {
                dyaw: VIEW_STEP,
                dpitch: 0.0
            })
        );
        assert_eq!(map_view(KeyCode::Char('I')), Some((0.0, -VIEW_STEP)));
        assert_eq!(map_view(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_every_game_key_is_reachable() {
        for key in GameKey::ALL {
            let label = key_label(key);
            let code = match label {
                "Space" => KeyCode::Char(' '),
                "Enter" => KeyCode::Enter,
                s => KeyCode::Char(s.chars().next().unwrap_or('?')),
            };
            assert_eq!(map_key(code), Some(key), "{label}");
        }
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Esc)));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
    }
}
