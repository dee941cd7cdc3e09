use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::form::FieldInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Ctrl+W: save, then leave on success.
    Save,
    /// Ctrl+S: save and keep editing.
    SaveAndStay,
    Quit,
    SwitchTab(i32),
    NextField,
    PrevField,
    ResetStatus,
    Activate,
    Reveal,
    Edit(KeyEvent),
    None,
}

pub fn classify(key: &KeyEvent) -> KeyCommand {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => KeyCommand::SaveAndStay,
            KeyCode::Char('w') | KeyCode::Char('W') => KeyCommand::Save,
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyCommand::Quit,
            KeyCode::Char('c') | KeyCode::Char('C') => KeyCommand::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyCommand::Reveal,
            KeyCode::Char('u') | KeyCode::Char('U') => KeyCommand::Edit(*key),
            KeyCode::Left => KeyCommand::SwitchTab(-1),
            KeyCode::Right => KeyCommand::SwitchTab(1),
            KeyCode::Tab => {
                let delta = if key.modifiers.contains(KeyModifiers::SHIFT) {
                    -1
                } else {
                    1
                };
                KeyCommand::SwitchTab(delta)
            }
            KeyCode::BackTab => KeyCommand::SwitchTab(-1),
            _ => KeyCommand::None,
        };
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => KeyCommand::NextField,
        KeyCode::BackTab | KeyCode::Up => KeyCommand::PrevField,
        KeyCode::Esc => KeyCommand::ResetStatus,
        KeyCode::Enter if !key.modifiers.contains(KeyModifiers::ALT) => KeyCommand::Activate,
        _ => KeyCommand::Edit(*key),
    }
}

/// Maps an editing key to a field input. `fast_step` is used with Shift.
pub fn field_input(key: &KeyEvent, fast_step: i32) -> Option<FieldInput> {
    let steps = if key.modifiers.contains(KeyModifiers::SHIFT) {
        fast_step
    } else {
        1
    };
    match key.code {
        KeyCode::Char('u') | KeyCode::Char('U') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(FieldInput::Clear)
        }
        KeyCode::Char(ch) => Some(FieldInput::Insert(ch)),
        KeyCode::Backspace => Some(FieldInput::Backspace),
        KeyCode::Delete => Some(FieldInput::Clear),
        KeyCode::Enter => Some(FieldInput::Newline),
        KeyCode::Right => Some(FieldInput::Step(steps)),
        KeyCode::Left => Some(FieldInput::Step(-steps)),
        _ => None,
    }
}
