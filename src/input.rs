//! Key bindings: arrows, WASD-style letters and vim keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press. Which ones apply depends on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    ToggleGhost,
    Restart,
    Pause,
    /// Back to the menu from the game-over screen.
    Menu,
    Quit,
    /// Menu only: next larger board.
    Larger,
    /// Menu only: next smaller board.
    Smaller,
    None,
}

/// Map a key event to an action. Anything held with Ctrl/Alt is ignored, except Ctrl-C which quits.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    let code = match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    if !modifiers.difference(KeyModifiers::SHIFT).is_empty() {
        return Action::None;
    }
    match code {
        KeyCode::Left | KeyCode::Char('a' | 'h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('d' | 'l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('w' | 'k' | 'r') => Action::Rotate,
        KeyCode::Down | KeyCode::Char('s' | 'j') => Action::SoftDrop,
        KeyCode::Enter | KeyCode::Char(' ') => Action::HardDrop,
        KeyCode::Char('g') => Action::ToggleGhost,
        KeyCode::Char('n') => Action::Restart,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('m') => Action::Menu,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('+' | '=') => Action::Larger,
        KeyCode::Char('-' | '_') => Action::Smaller,
        _ => Action::None,
    }
}
