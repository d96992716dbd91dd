//! Edit overlay: hosts the injected form while a row is created or edited.

use std::collections::HashMap;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear};
use tracing::debug;

use crate::Theme;
use crate::table::source::{SaveError, SaveResult};
use crate::ui::{EventResult, Result};

/// What a form reports back to the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent<R> {
    /// The user confirmed; carries the edited row.
    Save(R),
    /// The user cancelled.
    Close,
}

/// Errors shown by the form after a rejected save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: HashMap<String, String>,
    general: Option<String>,
}

impl FormErrors {
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn general(&self) -> Option<&str> {
        self.general.as_deref()
    }

    /// Replace all errors with `error`. A field error clears the general
    /// message and vice versa; field errors never accumulate.
    pub fn apply(&mut self, error: SaveError) {
        match error.field {
            Some(field) => {
                self.fields = HashMap::from([(field, error.message)]);
                self.general = None;
            }
            None => {
                self.fields.clear();
                self.general = Some(error.message);
            }
        }
    }
}

/// A form that edits one row.
///
/// The overlay does not prescribe the form's layout. It only asks for a
/// [`FormEvent`] when the user saves or cancels, and hands the current
/// errors over on every render.
pub trait EditForm {
    type Row;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<FormEvent<Self::Row>>>;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, errors: &FormErrors);

    /// Text pasted while the form is open. Returns whether a field took it.
    fn handle_paste(&mut self, text: &str) -> bool {
        _ = text;
        false
    }

    /// Height the form needs inside the overlay border.
    fn height(&self) -> u16 {
        12
    }
}

/// Builds a form, pre-populated with the row being edited if there is one.
pub type FormFactory<R> = Box<dyn Fn(Option<&R>) -> Box<dyn EditForm<Row = R>> + Send>;

/// Which data source operation a save goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update,
}

/// Ties a save result to the form session that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    pub mode: SaveMode,
    pub session: u64,
}

struct OpenForm<R> {
    session: u64,
    original: Option<R>,
    form: Box<dyn EditForm<Row = R>>,
    errors: FormErrors,
    saving: bool,
}

/// Open/closed state of the edit form and the errors of its last save.
pub struct EditOverlay<R> {
    factory: FormFactory<R>,
    open: Option<OpenForm<R>>,
    /// Incremented every time a form opens.
    sessions: u64,
}

impl<R> EditOverlay<R> {
    pub fn new(factory: FormFactory<R>) -> Self {
        Self {
            factory,
            open: None,
            sessions: 0,
        }
    }

    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_new(&mut self) {
        self.open_with(None);
    }

    pub fn open_edit(&mut self, row: R) {
        self.open_with(Some(row));
    }

    fn open_with(&mut self, original: Option<R>) {
        let form = (self.factory)(original.as_ref());
        self.sessions += 1;
        self.open = Some(OpenForm {
            session: self.sessions,
            original,
            form,
            errors: FormErrors::default(),
            saving: false,
        });
    }

    /// Discard the form and its working data. A save still in flight is
    /// left to complete; its result no longer reaches any form.
    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<FormEvent<R>>> {
        match &mut self.open {
            Some(open) => open.form.handle_key(key),
            None => Ok(EventResult::Ignored),
        }
    }

    pub fn handle_paste(&mut self, text: &str) -> bool {
        self.open.as_mut().is_some_and(|open| open.form.handle_paste(text))
    }

    /// Mark a save as in flight and report where it should go: `Create` if
    /// the form was opened for a new row, `Update` if for an existing one.
    ///
    /// Returns `None` when the overlay is closed or a save is already
    /// pending.
    pub fn begin_save(&mut self) -> Option<SaveTicket> {
        let open = self.open.as_mut()?;
        if open.saving {
            debug!("Save already in flight, ignoring");
            return None;
        }
        open.saving = true;
        let mode = if open.original.is_some() {
            SaveMode::Update
        } else {
            SaveMode::Create
        };
        Some(SaveTicket {
            mode,
            session: open.session,
        })
    }

    /// Apply the outcome of a save to the form that issued it. Closes on
    /// success; on failure the overlay stays open with the error attached.
    /// Results for a form that has since been closed are dropped.
    pub fn finish_save(&mut self, ticket: SaveTicket, result: SaveResult<R>) {
        let Some(open) = self.open.as_mut().filter(|open| open.session == ticket.session) else {
            debug!(session = ticket.session, "Form closed before its save finished");
            return;
        };
        match result {
            Ok(_) => self.open = None,
            Err(error) => {
                open.saving = false;
                open.errors.apply(error);
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(open) = &mut self.open else {
            return;
        };

        let title = match (&open.original, open.saving) {
            (_, true) => " Saving... ",
            (Some(_), false) => " Edit ",
            (None, false) => " New ",
        };
        let height = open.form.height().saturating_add(2);
        let popup_area = area.centered(Constraint::Percentage(60), Constraint::Length(height));
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.base()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        open.form.render(frame, inner, theme, &open.errors);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    impl FormErrors {
        pub(crate) fn is_empty(&self) -> bool {
            self.fields.is_empty() && self.general.is_none()
        }
    }

    impl<R> EditOverlay<R> {
        fn is_saving(&self) -> bool {
            self.open.as_ref().is_some_and(|open| open.saving)
        }

        pub(crate) fn errors(&self) -> Option<&FormErrors> {
            self.open.as_ref().map(|open| &open.errors)
        }
    }

    /// Saves whatever row it was opened with, or 0 for a new one.
    struct StubForm(Option<u32>);

    impl EditForm for StubForm {
        type Row = u32;

        fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<FormEvent<u32>>> {
            Ok(match key.code {
                KeyCode::Enter => FormEvent::Save(self.0.unwrap_or(0)).into(),
                KeyCode::Esc => FormEvent::Close.into(),
                _ => EventResult::Ignored,
            })
        }

        fn render(&mut self, _: &mut Frame, _: Rect, _: &Theme, _: &FormErrors) {}
    }

    fn overlay() -> EditOverlay<u32> {
        EditOverlay::new(Box::new(|row: Option<&u32>| {
            Box::new(StubForm(row.copied())) as Box<dyn EditForm<Row = u32>>
        }))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn save(overlay: &mut EditOverlay<u32>) -> SaveTicket {
        overlay.begin_save().unwrap()
    }

    #[test]
    fn test_new_saves_create_and_edit_saves_update() {
        let mut overlay = overlay();
        overlay.open_new();
        assert_eq!(save(&mut overlay).mode, SaveMode::Create);

        overlay.open_edit(7);
        assert_eq!(
            overlay.handle_key(key(KeyCode::Enter)).unwrap(),
            EventResult::Event(FormEvent::Save(7))
        );
        assert_eq!(save(&mut overlay).mode, SaveMode::Update);
    }

    #[test]
    fn test_duplicate_save_is_ignored_while_pending() {
        let mut overlay = overlay();
        overlay.open_new();
        assert!(overlay.begin_save().is_some());
        assert!(overlay.is_saving());
        assert_eq!(overlay.begin_save(), None);
    }

    #[test]
    fn test_success_closes() {
        let mut overlay = overlay();
        overlay.open_new();
        let ticket = save(&mut overlay);
        overlay.finish_save(ticket, Ok(1));
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_field_errors_replace_each_other() {
        let mut overlay = overlay();
        overlay.open_new();

        let ticket = save(&mut overlay);
        overlay.finish_save(ticket, Err(SaveError::field("name", "required")));
        let errors = overlay.errors().unwrap();
        assert_eq!(errors.field("name"), Some("required"));
        assert!(!overlay.is_saving());

        let ticket = save(&mut overlay);
        overlay.finish_save(ticket, Err(SaveError::field("sku", "taken")));
        let errors = overlay.errors().unwrap();
        assert_eq!(errors.field("name"), None);
        assert_eq!(errors.field("sku"), Some("taken"));
        assert!(overlay.is_open());
    }

    #[test]
    fn test_general_error_clears_field_errors() {
        let mut overlay = overlay();
        overlay.open_new();
        let ticket = save(&mut overlay);
        overlay.finish_save(ticket, Err(SaveError::field("name", "required")));
        let ticket = save(&mut overlay);
        overlay.finish_save(ticket, Err(SaveError::general("Server unavailable")));

        let errors = overlay.errors().unwrap();
        assert_eq!(errors.general(), Some("Server unavailable"));
        assert_eq!(errors.field("name"), None);
    }

    #[test]
    fn test_reopening_starts_without_errors() {
        let mut overlay = overlay();
        overlay.open_new();
        let ticket = save(&mut overlay);
        overlay.finish_save(ticket, Err(SaveError::general("nope")));
        overlay.close();
        overlay.open_edit(3);
        assert!(overlay.errors().unwrap().is_empty());
    }

    #[test]
    fn test_result_of_closed_form_is_dropped() {
        let mut overlay = overlay();
        overlay.open_new();
        let stale = save(&mut overlay);
        overlay.close();
        overlay.open_new();

        overlay.finish_save(stale, Err(SaveError::field("name", "required")));
        assert!(overlay.errors().unwrap().is_empty());
        overlay.finish_save(stale, Ok(1));
        assert!(overlay.is_open());

        let current = save(&mut overlay);
        assert_ne!(current.session, stale.session);
        overlay.finish_save(current, Ok(1));
        assert!(!overlay.is_open());
    }
}
