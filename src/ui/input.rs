/// Keyboard → `Command` mapping.
///
/// Each key press is one discrete command. Release events are ignored so
/// terminals with keyboard enhancement don't double-fire.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::command::{Command, Direction};

const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_INTERACT: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub const HELP: &str = "WASD / arrows: move   F: interact   Esc: quit";

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release { return None; }

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }

    let code = &key.code;
    let command = if KEYS_UP.contains(code) {
        Command::Move(Direction::Up)
    } else if KEYS_DOWN.contains(code) {
        Command::Move(Direction::Down)
    } else if KEYS_LEFT.contains(code) {
        Command::Move(Direction::Left)
    } else if KEYS_RIGHT.contains(code) {
        Command::Move(Direction::Right)
    } else if KEYS_INTERACT.contains(code) {
        Command::Interact
    } else if KEYS_QUIT.contains(code) {
        Command::Quit
    } else {
        return None;
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn wasd_and_arrows_move() {
        assert_eq!(command_for(press(KeyCode::Char('w'))), Some(Command::Move(Direction::Up)));
        assert_eq!(command_for(press(KeyCode::Down)), Some(Command::Move(Direction::Down)));
        assert_eq!(command_for(press(KeyCode::Char('A'))), Some(Command::Move(Direction::Left)));
        assert_eq!(command_for(press(KeyCode::Right)), Some(Command::Move(Direction::Right)));
    }

    #[test]
    fn f_interacts_and_esc_quits() {
        assert_eq!(command_for(press(KeyCode::Char('f'))), Some(Command::Interact));
        assert_eq!(command_for(press(KeyCode::Esc)), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn release_and_unknown_keys_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('d'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(command_for(release), None);
        assert_eq!(command_for(press(KeyCode::Char('z'))), None);
        assert_eq!(command_for(press(KeyCode::Char('c'))), None);
    }
}
