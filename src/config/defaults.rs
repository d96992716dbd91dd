use crossterm::event::KeyCode;

use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::{
    DialogKeybindings, FormKeybindings, GlobalKeybindings, NavigationKeybindings,
    TableKeybindings,
};

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::char('q').into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple([Key::char('k'), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple([Key::char('j'), Key::new(KeyCode::Down)]),
            home: KeyBinding::multiple([Key::char('g'), Key::new(KeyCode::Home)]),
            end: KeyBinding::multiple([Key::char('G'), Key::new(KeyCode::End)]),
            column_left: KeyBinding::multiple([
                Key::char('h'),
                Key::new(KeyCode::Left),
                Key::new(KeyCode::BackTab),
            ]),
            column_right: KeyBinding::multiple([
                Key::char('l'),
                Key::new(KeyCode::Right),
                Key::new(KeyCode::Tab),
            ]),
        }
    }
}

impl Default for TableKeybindings {
    fn default() -> Self {
        Self {
            new: Key::char('n').into(),
            edit: KeyBinding::multiple([Key::char('e'), Key::new(KeyCode::Enter)]),
            delete: KeyBinding::multiple([Key::char('d'), Key::new(KeyCode::Delete)]),
            search: Key::char('/').into(),
            sort: Key::char('s').into(),
            prev_page: KeyBinding::multiple([Key::char('['), Key::new(KeyCode::PageUp)]),
            next_page: KeyBinding::multiple([Key::char(']'), Key::new(KeyCode::PageDown)]),
            widen: Key::char('+').into(),
            narrow: Key::char('-').into(),
            filter: Key::char('f').into(),
            reload: Key::char('r').into(),
        }
    }
}

impl Default for FormKeybindings {
    fn default() -> Self {
        Self {
            save: KeyBinding::multiple([Key::new(KeyCode::Enter), Key::with_ctrl(KeyCode::Char('s'))]),
            cancel: Key::new(KeyCode::Esc).into(),
            next_field: KeyBinding::multiple([Key::new(KeyCode::Tab), Key::new(KeyCode::Down)]),
            prev_field: KeyBinding::multiple([Key::new(KeyCode::BackTab), Key::new(KeyCode::Up)]),
            toggle: Key::char(' ').into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: KeyBinding::multiple([Key::char('y'), Key::char('Y'), Key::new(KeyCode::Enter)]),
            cancel: KeyBinding::multiple([Key::char('n'), Key::char('N'), Key::new(KeyCode::Esc)]),
        }
    }
}
