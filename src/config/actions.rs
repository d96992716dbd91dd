#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    Home,
    End,
    ColumnLeft,
    ColumnRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    New,
    Edit,
    Delete,
    Search,
    Sort,
    PrevPage,
    NextPage,
    Widen,
    Narrow,
    Filter,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Save,
    Cancel,
    NextField,
    PrevField,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Confirm,
    Cancel,
}
