use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use smol_str::{SmolStr, ToSmolStr};

/// Centrally defined key actions for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Leave from the landing view, where `q` is text.
    Exit,
    SignOut,
    Home,
    Logs,
    /// Open the logs from the landing view, where `L` is text.
    LandingLogs,
    Refresh,
    Restart,
    ChooseLeft,
    ChooseRight,
    PreviewLeft,
    PreviewRight,
    StopPreview,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GotoTop,
    GotoBottom,
    Select,
    Back,
    ClearLine,
    Char(char),
    DeleteChar,
}

// ── Key code constants ───────────────────────────────────────────

pub const KEY_QUIT: KeyCode = KeyCode::Char('q');
pub const KEY_SIGN_OUT: KeyCode = KeyCode::Char('S');
pub const KEY_HOME: KeyCode = KeyCode::Char('H');
pub const KEY_LOGS: KeyCode = KeyCode::Char('L');
pub const KEY_LANDING_LOGS: KeyCode = KeyCode::Tab;
pub const KEY_REFRESH: KeyCode = KeyCode::Char('r');
pub const KEY_CHOOSE_LEFT: KeyCode = KeyCode::Left;
pub const KEY_CHOOSE_LEFT_ALT: KeyCode = KeyCode::Char('1');
pub const KEY_CHOOSE_RIGHT: KeyCode = KeyCode::Right;
pub const KEY_CHOOSE_RIGHT_ALT: KeyCode = KeyCode::Char('2');
pub const KEY_PREVIEW_LEFT: KeyCode = KeyCode::Char('p');
pub const KEY_PREVIEW_RIGHT: KeyCode = KeyCode::Char('P');
pub const KEY_STOP_PREVIEW: KeyCode = KeyCode::Char('x');
pub const KEY_SELECT: KeyCode = KeyCode::Enter;
pub const KEY_BACK: KeyCode = KeyCode::Esc;
pub const KEY_UP: KeyCode = KeyCode::Up;
pub const KEY_DOWN: KeyCode = KeyCode::Down;
pub const KEY_PAGE_UP: KeyCode = KeyCode::PageUp;
pub const KEY_PAGE_DOWN: KeyCode = KeyCode::PageDown;
pub const KEY_GOTO_TOP: KeyCode = KeyCode::Home;
pub const KEY_GOTO_BOTTOM: KeyCode = KeyCode::End;
pub const KEY_DELETE_CHAR: KeyCode = KeyCode::Backspace;
pub const KEY_CONFIRM_YES: KeyCode = KeyCode::Char('y');
pub const KEY_CONFIRM_NO: KeyCode = KeyCode::Char('n');

impl Action {
    /// Label shown in the help bar. Returns `None` for actions that
    /// shouldn't appear (navigation, text input, etc.).
    pub fn help_label(&self) -> Option<(SmolStr, SmolStr)> {
        let (key, desc): (SmolStr, &str) = match self {
            Action::Quit => (key_label(KEY_QUIT), "quit"),
            Action::SignOut => (key_label(KEY_SIGN_OUT), "sign out"),
            Action::Home => (key_label(KEY_HOME), "home"),
            Action::Exit => (key_label(KEY_BACK), "quit"),
            Action::Logs => (key_label(KEY_LOGS), "logs"),
            Action::LandingLogs => (key_label(KEY_LANDING_LOGS), "logs"),
            Action::Refresh => (key_label(KEY_REFRESH), "refresh"),
            Action::Restart => (key_label(KEY_REFRESH), "play again"),
            Action::ChooseLeft => ("\u{2190}/1".into(), "pick left"),
            Action::ChooseRight => ("\u{2192}/2".into(), "pick right"),
            Action::PreviewLeft => (key_label(KEY_PREVIEW_LEFT), "preview left"),
            Action::PreviewRight => (key_label(KEY_PREVIEW_RIGHT), "preview right"),
            Action::StopPreview => (key_label(KEY_STOP_PREVIEW), "stop"),
            Action::Select => (key_label(KEY_SELECT), "select"),
            Action::Back => (key_label(KEY_BACK), "back"),
            _ => return None,
        };
        Some((key, desc.into()))
    }
}

/// Named keys are shown in lowercase; characters keep their case, since
/// `p` and `P` do different things.
fn key_label(code: KeyCode) -> SmolStr {
    match code {
        KeyCode::Char(_) => code.to_smolstr(),
        _ => code.to_smolstr().to_lowercase().into(),
    }
}

/// Keys that work everywhere except while typing on the landing view.
fn global_action(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KEY_QUIT => Some(Action::Quit),
        KEY_SIGN_OUT => Some(Action::SignOut),
        KEY_HOME => Some(Action::Home),
        KEY_LOGS => Some(Action::Logs),
        _ => None,
    }
}

/// Resolve a key event on the landing view, where most keys are text input.
pub fn landing_action(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KEY_BACK => Some(Action::Exit),
        KEY_LANDING_LOGS => Some(Action::LandingLogs),
        KEY_SELECT => Some(Action::Select),
        KEY_DELETE_CHAR => Some(Action::DeleteChar),
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'u' {
                Some(Action::ClearLine)
            } else {
                Some(Action::Char(c))
            }
        }
        _ => None,
    }
}

/// Resolve a key event on the playlist browser.
pub fn playlists_action(key: &KeyEvent) -> Option<Action> {
    global_action(key).or(match key.code {
        KEY_REFRESH => Some(Action::Refresh),
        KEY_UP => Some(Action::MoveUp),
        KEY_DOWN => Some(Action::MoveDown),
        KEY_PAGE_UP => Some(Action::PageUp),
        KEY_PAGE_DOWN => Some(Action::PageDown),
        KEY_GOTO_TOP => Some(Action::GotoTop),
        KEY_GOTO_BOTTOM => Some(Action::GotoBottom),
        KEY_SELECT => Some(Action::Select),
        _ => None,
    })
}

/// Resolve a key event on the battle view.
pub fn battle_action(key: &KeyEvent) -> Option<Action> {
    global_action(key).or(match key.code {
        KEY_CHOOSE_LEFT | KEY_CHOOSE_LEFT_ALT => Some(Action::ChooseLeft),
        KEY_CHOOSE_RIGHT | KEY_CHOOSE_RIGHT_ALT => Some(Action::ChooseRight),
        KEY_PREVIEW_LEFT => Some(Action::PreviewLeft),
        KEY_PREVIEW_RIGHT => Some(Action::PreviewRight),
        KEY_STOP_PREVIEW => Some(Action::StopPreview),
        KEY_REFRESH => Some(Action::Restart),
        KEY_BACK => Some(Action::Back),
        _ => None,
    })
}

/// Resolve a key event in logs context.
pub fn logs_action(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KEY_BACK | KEY_LOGS | KEY_LANDING_LOGS | KEY_QUIT => Some(Action::Back),
        KEY_UP => Some(Action::MoveUp),
        KEY_DOWN => Some(Action::MoveDown),
        KEY_PAGE_UP => Some(Action::PageUp),
        KEY_PAGE_DOWN => Some(Action::PageDown),
        KEY_GOTO_TOP => Some(Action::GotoTop),
        KEY_GOTO_BOTTOM => Some(Action::GotoBottom),
        _ => None,
    }
}

/// Resolve a key event into an action in quit-confirmation context.
/// `y` / Enter confirms; any other key cancels.
pub fn quit_confirm_action(key: &KeyEvent) -> Action {
    match key.code {
        KEY_CONFIRM_YES | KEY_SELECT => Action::Select,
        _ => Action::Back,
    }
}

/// Ordered list of actions to show in the landing help bar.
pub const LANDING_HELP: &[Action] = &[Action::Select, Action::LandingLogs, Action::Exit];

/// Ordered list of actions to show in the playlists help bar.
pub const PLAYLISTS_HELP: &[Action] = &[
    Action::Quit,
    Action::Select,
    Action::Refresh,
    Action::Logs,
    Action::SignOut,
];

/// Ordered list of actions to show while a matchup is up.
pub const MATCHUP_HELP: &[Action] = &[
    Action::ChooseLeft,
    Action::ChooseRight,
    Action::PreviewLeft,
    Action::PreviewRight,
    Action::StopPreview,
    Action::Back,
    Action::Logs,
    Action::Quit,
];

/// Ordered list of actions to show once a battle has finished or stalled.
pub const FINISHED_HELP: &[Action] = &[
    Action::Restart,
    Action::Back,
    Action::Home,
    Action::Logs,
    Action::Quit,
];

/// Ordered list of actions to show in the logs help bar.
pub const LOGS_HELP: &[Action] = &[Action::Back];

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn landing_keys_are_mostly_text() {
        assert_eq!(landing_action(&press(KEY_QUIT)), Some(Action::Char('q')));
        assert_eq!(landing_action(&press(KEY_BACK)), Some(Action::Exit));
        assert_eq!(
            landing_action(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            Some(Action::ClearLine)
        );
    }

    #[test]
    fn battle_keys() {
        assert_eq!(battle_action(&press(KeyCode::Char('1'))), Some(Action::ChooseLeft));
        assert_eq!(battle_action(&press(KeyCode::Right)), Some(Action::ChooseRight));
        assert_eq!(battle_action(&press(KeyCode::Char('P'))), Some(Action::PreviewRight));
        assert_eq!(battle_action(&press(KeyCode::Char('r'))), Some(Action::Restart));
        assert_eq!(battle_action(&press(KeyCode::Char('S'))), Some(Action::SignOut));
    }

    #[test]
    fn help_labels_keep_character_case() {
        assert_eq!(
            Action::Select.help_label(),
            Some(("enter".into(), "select".into()))
        );
        assert_eq!(
            Action::PreviewRight.help_label(),
            Some(("P".into(), "preview right".into()))
        );
        assert!(Action::MoveUp.help_label().is_none());
    }
}
