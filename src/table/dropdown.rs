use std::fmt;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

type OnSelect = Box<dyn Fn(&str) + Send>;

/// Single-choice filter on one field, rendered in the toolbar.
///
/// The selected value ends up in the query's filter map as
/// `{field: value}`.
pub struct DropdownFilter {
    pub field: String,
    options: Vec<DropdownOption>,
    selected: usize,
    on_select: Option<OnSelect>,
}

impl DropdownFilter {
    /// The first option starts out selected.
    pub fn new(field: impl Into<String>, options: Vec<DropdownOption>) -> Self {
        Self {
            field: field.into(),
            options,
            selected: 0,
            on_select: None,
        }
    }

    /// Called with the new value whenever the selection changes.
    #[must_use]
    pub fn on_select(mut self, callback: impl Fn(&str) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&DropdownOption> {
        self.options.get(self.selected)
    }

    pub fn selected_value(&self) -> &str {
        self.selected().map_or("", |o| o.value.as_str())
    }

    pub fn selected_label(&self) -> &str {
        self.selected().map_or("", |o| o.label.as_str())
    }

    /// Index of the option after the current one, wrapping around.
    pub fn next_index(&self) -> usize {
        if self.options.is_empty() {
            0
        } else {
            (self.selected + 1) % self.options.len()
        }
    }

    /// Select the option at `index`. Returns the new value if the selection
    /// actually changed.
    pub fn select(&mut self, index: usize) -> Option<&str> {
        if index == self.selected || index >= self.options.len() {
            return None;
        }
        self.selected = index;
        let value = self.options[index].value.as_str();
        debug!(field = %self.field, value, "Dropdown selection changed");
        if let Some(callback) = &self.on_select {
            callback(value);
        }
        Some(value)
    }
}

impl fmt::Debug for DropdownFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownFilter")
            .field("field", &self.field)
            .field("options", &self.options)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}
