//! The table controller.
//!
//! Follows the single-funnel update pattern: input handlers and async
//! commands only queue [`TableMsg`]s, and `update()` is the one place that
//! mutates state and returns commands to spawn. Any number of query changes
//! processed in one `update()` result in at most one fetch.

use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::Theme;
use crate::commands::{Command, DeleteRowCmd, FetchPageCmd, SaveRowCmd};
use crate::config::{DialogAction, FormAction, KeyResolver, NavAction, TableAction};
use crate::table::column::Column;
use crate::table::dropdown::DropdownFilter;
use crate::table::fetch::FetchOrchestrator;
use crate::table::grid::{Grid, GridHit, GridView};
use crate::table::message::TableMsg;
use crate::table::overlay::{EditOverlay, FormEvent, FormFactory, SaveTicket};
use crate::table::pager::{PageWindow, PagerHits, render_pager};
use crate::table::query::{OrderBy, QueryState};
use crate::table::resize::ResizeController;
use crate::table::source::{DataSource, Page, Record, SaveResult};
use crate::table::toolbar::{self, Toolbar, ToolbarEvent};
use crate::ui::{
    Component, ConfirmDialog, ConfirmEvent, EventResult, Keybinding, Result, Spinner,
};

const DELETE_PROMPT: &str = "Do you really want to proceed?";

/// Result from `update()`
pub enum UpdateResult {
    /// No action needed
    Idle,
    /// Spawn these commands
    Commands(Vec<Box<dyn Command>>),
}

impl<T: Command> From<T> for UpdateResult {
    fn from(value: T) -> Self {
        Self::Commands(vec![Box::new(value)])
    }
}

/// Everything a table is configured with.
pub struct DataTableOptions<R> {
    pub columns: Vec<Column<R>>,
    pub form: FormFactory<R>,
    /// Rows per page, fixed for the lifetime of the table.
    pub page_size: usize,
    pub searchable: bool,
    pub dropdown: Option<DropdownFilter>,
}

impl<R> DataTableOptions<R> {
    pub fn new(columns: Vec<Column<R>>, form: FormFactory<R>) -> Self {
        Self {
            columns,
            form,
            page_size: 10,
            searchable: true,
            dropdown: None,
        }
    }

    #[must_use]
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    #[must_use]
    pub fn dropdown(mut self, dropdown: DropdownFilter) -> Self {
        self.dropdown = Some(dropdown);
        self
    }
}

struct PendingDelete<R> {
    row: R,
    dialog: ConfirmDialog,
}

/// Paginated CRUD table over a [`DataSource`].
pub struct DataTable<S: DataSource> {
    source: Arc<S>,
    columns: Vec<Column<S::Row>>,
    query: QueryState,
    fetch: FetchOrchestrator,
    rows: Vec<S::Row>,
    count: usize,
    grid: Grid,
    resize: ResizeController,
    toolbar: Toolbar,
    overlay: EditOverlay<S::Row>,
    pending_delete: Option<PendingDelete<S::Row>>,
    pager: PagerHits,
    spinner: Spinner,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<TableMsg<S::Row>>,
    msg_rx: UnboundedReceiver<TableMsg<S::Row>>,
}

impl<S: DataSource> DataTable<S> {
    /// The first `update()` issues the initial fetch.
    pub fn new(source: Arc<S>, options: DataTableOptions<S::Row>, resolver: Arc<KeyResolver>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();

        let mut query = QueryState::new(options.page_size);
        if let Some(dropdown) = &options.dropdown {
            query = query.with_dropdown(dropdown.field.clone(), dropdown.selected_value());
        }
        let mut fetch = FetchOrchestrator::new();
        fetch.refresh();

        Self {
            source,
            grid: Grid::new(options.columns.len()),
            resize: ResizeController::new(options.columns.iter().map(|c| c.width).collect()),
            columns: options.columns,
            query,
            fetch,
            rows: Vec::new(),
            count: 0,
            toolbar: Toolbar::new(options.searchable, options.dropdown),
            overlay: EditOverlay::new(options.form),
            pending_delete: None,
            pager: PagerHits::default(),
            spinner: Spinner::default(),
            resolver,
            msg_tx,
            msg_rx,
        }
    }

    pub const fn count(&self) -> usize {
        self.count
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.query.page_number(), self.query.page_size(), self.count)
    }

    pub const fn order_by(&self) -> Option<&OrderBy> {
        self.query.order_by()
    }

    /// Whether keys are currently going to a text field or a popup, so
    /// application-wide shortcuts must not fire.
    pub fn captures_input(&self) -> bool {
        self.pending_delete.is_some() || self.overlay.is_open() || self.toolbar.search_focused()
    }

    /// Queue a message to be processed by update().
    pub fn queue(&self, msg: TableMsg<S::Row>) {
        let _ = self.msg_tx.send(msg);
    }

    fn selected_row(&self) -> Option<S::Row> {
        self.grid.selected().and_then(|i| self.rows.get(i)).cloned()
    }

    /// Process all queued messages, then issue the pending fetch if any
    /// message changed the query.
    pub fn update(&mut self) -> UpdateResult {
        let mut commands: Vec<Box<dyn Command>> = Vec::new();

        while let Ok(msg) = self.msg_rx.try_recv() {
            if let Some(command) = self.process_message(msg) {
                commands.push(command);
            }
        }

        if let Some(seq) = self.fetch.take_pending() {
            commands.push(Box::new(FetchPageCmd::new(
                Arc::clone(&self.source),
                self.query.to_query(),
                seq,
                self.msg_tx.clone(),
            )));
        }

        if commands.is_empty() {
            UpdateResult::Idle
        } else {
            UpdateResult::Commands(commands)
        }
    }

    fn process_message(&mut self, msg: TableMsg<S::Row>) -> Option<Box<dyn Command>> {
        match msg {
            TableMsg::Refresh => self.fetch.refresh(),

            TableMsg::PrevPage => {
                let page = self.query.page_number();
                if self.window().has_prev && self.query.set_page_number(page - 1) {
                    self.fetch.refresh();
                }
            }

            TableMsg::NextPage => {
                let page = self.query.page_number();
                if self.window().has_next && self.query.set_page_number(page + 1) {
                    self.fetch.refresh();
                }
            }

            TableMsg::SubmitSearch(search) => {
                if self.query.set_search(search) {
                    self.fetch.refresh();
                }
            }

            TableMsg::SortColumn(index) => self.sort_by(index),

            TableMsg::SelectFilter(index) => {
                let value = self
                    .toolbar
                    .dropdown_mut()
                    .and_then(|d| d.select(index).map(str::to_string));
                if let Some(value) = value
                    && self.query.set_selected(value)
                {
                    self.fetch.refresh();
                }
            }

            TableMsg::OpenNew => self.overlay.open_new(),
            TableMsg::OpenEdit(row) => self.overlay.open_edit(row),
            TableMsg::CloseForm => self.overlay.close(),

            TableMsg::SaveForm(row) => {
                let ticket = self.overlay.begin_save()?;
                info!(mode = ?ticket.mode, key = ?row.key(), "Saving row");
                return Some(Box::new(SaveRowCmd::new(
                    Arc::clone(&self.source),
                    row,
                    ticket,
                    self.msg_tx.clone(),
                )));
            }

            TableMsg::RequestDelete(row) => {
                let dialog = ConfirmDialog::new(DELETE_PROMPT, Arc::clone(&self.resolver))
                    .with_title("Delete");
                self.pending_delete = Some(PendingDelete { row, dialog });
            }

            TableMsg::ConfirmDelete => {
                let pending = self.pending_delete.take()?;
                info!(key = ?pending.row.key(), "Deleting row");
                return Some(Box::new(DeleteRowCmd::new(
                    Arc::clone(&self.source),
                    pending.row,
                    self.msg_tx.clone(),
                )));
            }

            TableMsg::CancelDelete => {
                if let Some(pending) = self.pending_delete.take() {
                    debug!(key = ?pending.row.key(), "Delete declined");
                }
            }

            TableMsg::PageLoaded { seq, page } => {
                if self.fetch.complete(seq) {
                    self.replace_rows(page);
                }
            }

            TableMsg::SaveCompleted { ticket, result } => self.save_completed(ticket, result),

            TableMsg::DeleteCompleted(result) => {
                if let Err(error) = &result {
                    warn!(%error, "Delete failed");
                }
                self.fetch.refresh();
            }
        }
        None
    }

    fn sort_by(&mut self, index: usize) {
        let Some(column) = self.columns.get(index) else {
            return;
        };
        if !column.sortable {
            debug!(field = %column.field, "Column is not sortable");
            return;
        }
        let order = OrderBy::toggled(self.query.order_by(), &column.field);
        if self.query.set_order_by(order) {
            self.fetch.refresh();
        }
    }

    /// A stored row is refetched even when its form was cancelled meanwhile.
    fn save_completed(&mut self, ticket: SaveTicket, result: SaveResult<S::Row>) {
        match &result {
            Ok(row) => {
                info!(key = ?row.key(), "Row saved");
                self.fetch.refresh();
            }
            Err(error) => warn!(%error, "Save rejected"),
        }
        self.overlay.finish_save(ticket, result);
    }

    fn replace_rows(&mut self, page: Page<S::Row>) {
        let page_number = self.query.page_number();
        if page.rows.is_empty() && page.count > 0 && page_number > 1 {
            // The current page fell off the end, e.g. after a delete.
            let last = page.count.div_ceil(self.query.page_size());
            debug!(page_number, last, "Page out of range, moving to last page");
            if self.query.set_page_number(last) {
                self.fetch.refresh();
                return;
            }
        }

        let selected = self.selected_row().map(|row| row.key());
        self.rows = page.rows;
        self.count = page.count;
        let keep = selected.and_then(|key| self.rows.iter().position(|row| row.key() == key));
        self.grid.set_rows(self.rows.len(), keep);
        debug!(rows = self.rows.len(), count = self.count, "Page replaced");
    }

    fn handle_table_key(&mut self, key: &KeyEvent) -> EventResult<()> {
        let r = Arc::clone(&self.resolver);

        if r.matches_table(key, TableAction::New) {
            self.queue(TableMsg::OpenNew);
        } else if r.matches_table(key, TableAction::Edit) {
            let Some(row) = self.selected_row() else {
                return EventResult::Consumed;
            };
            self.queue(TableMsg::OpenEdit(row));
        } else if r.matches_table(key, TableAction::Delete) {
            let Some(row) = self.selected_row() else {
                return EventResult::Consumed;
            };
            self.queue(TableMsg::RequestDelete(row));
        } else if r.matches_table(key, TableAction::Search) {
            if !self.toolbar.is_searchable() {
                return EventResult::Ignored;
            }
            self.toolbar.focus_search();
        } else if r.matches_table(key, TableAction::Sort) {
            self.queue(TableMsg::SortColumn(self.grid.focused_column()));
        } else if r.matches_table(key, TableAction::PrevPage) {
            self.queue(TableMsg::PrevPage);
        } else if r.matches_table(key, TableAction::NextPage) {
            self.queue(TableMsg::NextPage);
        } else if r.matches_table(key, TableAction::Widen) {
            self.resize.resize_by(self.grid.focused_column(), 1);
        } else if r.matches_table(key, TableAction::Narrow) {
            self.resize.resize_by(self.grid.focused_column(), -1);
        } else if r.matches_table(key, TableAction::Filter) {
            let Some(dropdown) = self.toolbar.dropdown() else {
                return EventResult::Ignored;
            };
            self.queue(TableMsg::SelectFilter(dropdown.next_index()));
        } else if r.matches_table(key, TableAction::Reload) {
            self.queue(TableMsg::Refresh);
        } else if r.matches_nav(key, NavAction::Up) {
            self.grid.select_previous();
        } else if r.matches_nav(key, NavAction::Down) {
            self.grid.select_next();
        } else if r.matches_nav(key, NavAction::Home) {
            self.grid.select_first();
        } else if r.matches_nav(key, NavAction::End) {
            self.grid.select_last();
        } else if r.matches_nav(key, NavAction::ColumnLeft) {
            self.grid.focus_left();
        } else if r.matches_nav(key, NavAction::ColumnRight) {
            self.grid.focus_right();
        } else {
            return EventResult::Ignored;
        }
        EventResult::Consumed
    }

    fn handle_click(&mut self, mouse: MouseEvent) -> Result<EventResult<()>> {
        match self.toolbar.handle_mouse(mouse)? {
            EventResult::Event(ToolbarEvent::New) => self.queue(TableMsg::OpenNew),
            EventResult::Event(ToolbarEvent::Search(search)) => {
                self.queue(TableMsg::SubmitSearch(search));
            }
            EventResult::Event(ToolbarEvent::Filter(index)) => {
                self.queue(TableMsg::SelectFilter(index));
            }
            EventResult::Consumed => {}
            EventResult::Ignored => return Ok(self.handle_body_click(mouse.column, mouse.row)),
        }
        Ok(EventResult::Consumed)
    }

    fn handle_body_click(&mut self, x: u16, y: u16) -> EventResult<()> {
        let at = Position::new(x, y);
        let window = self.window();
        if self.pager.prev.contains(at) {
            if window.has_prev {
                self.queue(TableMsg::PrevPage);
            }
            return EventResult::Consumed;
        }
        if self.pager.next.contains(at) {
            if window.has_next {
                self.queue(TableMsg::NextPage);
            }
            return EventResult::Consumed;
        }

        match self.grid.hit_test(x, y) {
            Some(GridHit::ResizeHandle(column)) => {
                self.resize.begin(column, x);
            }
            Some(GridHit::Header(column)) => self.queue(TableMsg::SortColumn(column)),
            Some(GridHit::Row(index)) => self.grid.select(index),
            Some(GridHit::Edit(index)) => {
                self.grid.select(index);
                if let Some(row) = self.rows.get(index) {
                    self.queue(TableMsg::OpenEdit(row.clone()));
                }
            }
            Some(GridHit::Delete(index)) => {
                self.grid.select(index);
                if let Some(row) = self.rows.get(index) {
                    self.queue(TableMsg::RequestDelete(row.clone()));
                }
            }
            None => return EventResult::Ignored,
        }
        EventResult::Consumed
    }

    /// Keybinding hints for whatever currently has focus.
    pub fn keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        if self.pending_delete.is_some() {
            return vec![
                Keybinding::new(r.display_dialog(DialogAction::Confirm), "Delete"),
                Keybinding::new(r.display_dialog(DialogAction::Cancel), "Keep"),
            ];
        }
        if self.overlay.is_open() {
            return vec![
                Keybinding::new(r.display_form(FormAction::Save), "Save"),
                Keybinding::new(r.display_form(FormAction::Cancel), "Cancel"),
                Keybinding::new(r.display_form(FormAction::NextField), "Next field"),
                Keybinding::new(r.display_form(FormAction::Toggle), "Toggle"),
            ];
        }
        if self.toolbar.search_focused() {
            return vec![
                Keybinding::new("enter", "Search"),
                Keybinding::new("esc", "Back to table"),
            ];
        }

        let mut hints = vec![
            Keybinding::new(r.display_table(TableAction::New), "New"),
            Keybinding::new(r.display_table(TableAction::Edit), "Edit"),
            Keybinding::new(r.display_table(TableAction::Delete), "Delete"),
        ];
        if self.toolbar.is_searchable() {
            hints.push(Keybinding::new(r.display_table(TableAction::Search), "Search"));
        }
        hints.push(Keybinding::new(
            format!(
                "{}/{}",
                r.display_nav(NavAction::ColumnLeft),
                r.display_nav(NavAction::ColumnRight)
            ),
            "Column",
        ));
        hints.push(Keybinding::new(r.display_table(TableAction::Sort), "Sort"));
        if self.toolbar.dropdown().is_some() {
            hints.push(Keybinding::new(r.display_table(TableAction::Filter), "Filter"));
        }
        hints.extend([
            Keybinding::new(
                format!(
                    "{}/{}",
                    r.display_table(TableAction::PrevPage),
                    r.display_table(TableAction::NextPage)
                ),
                "Page",
            ),
            Keybinding::new(
                format!(
                    "{}/{}",
                    r.display_table(TableAction::Narrow),
                    r.display_table(TableAction::Widen)
                ),
                "Resize",
            ),
            Keybinding::new(r.display_table(TableAction::Reload), "Reload"),
        ]);
        hints
    }

    fn render_footer(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [status, pager] =
            Layout::horizontal([Constraint::Length(14), Constraint::Fill(1)]).areas(area);
        if self.fetch.is_loading() {
            self.spinner.render(frame, status, theme);
        }
        self.pager = render_pager(frame, pager, theme, &self.window());
    }
}

impl<S: DataSource> Component for DataTable<S> {
    type Output = ();

    /// Popups get keys first, then the search box, then the table.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if let Some(pending) = &mut self.pending_delete {
            match pending.dialog.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => self.queue(TableMsg::ConfirmDelete),
                EventResult::Event(ConfirmEvent::Cancelled) => self.queue(TableMsg::CancelDelete),
                EventResult::Consumed | EventResult::Ignored => {}
            }
            return Ok(EventResult::Consumed);
        }

        if self.overlay.is_open() {
            match self.overlay.handle_key(key)? {
                EventResult::Event(FormEvent::Save(row)) => self.queue(TableMsg::SaveForm(row)),
                EventResult::Event(FormEvent::Close) => self.queue(TableMsg::CloseForm),
                EventResult::Consumed | EventResult::Ignored => {}
            }
            return Ok(EventResult::Consumed);
        }

        if self.toolbar.search_focused() {
            if let EventResult::Event(ToolbarEvent::Search(search)) = self.toolbar.handle_key(key)? {
                self.queue(TableMsg::SubmitSearch(search));
            }
            return Ok(EventResult::Consumed);
        }

        Ok(self.handle_table_key(&key))
    }

    /// Pasted text goes to the open form, else to the focused search box.
    fn handle_paste(&mut self, text: &str) -> bool {
        if self.pending_delete.is_some() {
            return false;
        }
        if self.overlay.is_open() {
            return self.overlay.handle_paste(text);
        }
        self.toolbar.handle_paste(text)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<()>> {
        if self.pending_delete.is_some() || self.overlay.is_open() {
            return Ok(EventResult::Consumed);
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.handle_click(mouse),
            MouseEventKind::Drag(MouseButton::Left) => {
                Ok(match self.resize.drag_to(mouse.column) {
                    Some(_) => EventResult::Consumed,
                    None => EventResult::Ignored,
                })
            }
            MouseEventKind::Up(MouseButton::Left) => Ok(match self.resize.end() {
                Some(_) => EventResult::Consumed,
                None => EventResult::Ignored,
            }),
            MouseEventKind::Moved if !self.resize.is_dragging() => {
                self.grid.hover(mouse.column, mouse.row);
                Ok(EventResult::Ignored)
            }
            _ => Ok(EventResult::Ignored),
        }
    }

    fn handle_tick(&mut self) {
        if self.fetch.is_loading() {
            self.spinner.handle_tick();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [toolbar_area, grid_area, footer_area] = Layout::vertical([
            Constraint::Length(toolbar::HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.toolbar.render(frame, toolbar_area, theme);

        let view = GridView {
            columns: &self.columns,
            widths: self.resize.widths(),
            rows: &self.rows,
            order_by: self.query.order_by(),
            dragging: self.resize.dragging_column(),
        };
        self.grid.render(frame, grid_area, theme, &view);

        self.render_footer(frame, footer_area, theme);

        self.overlay.render(frame, area, theme);
        if let Some(pending) = &mut self.pending_delete {
            pending.dialog.render(frame, area, theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::table::dropdown::DropdownOption;
    use crate::table::overlay::{EditForm, FormErrors};
    use crate::table::query::Query;
    use crate::table::source::SaveError;
    use crate::table::value::Value;

    impl<S: DataSource> DataTable<S> {
        fn rows(&self) -> &[S::Row] {
            &self.rows
        }

        const fn is_loading(&self) -> bool {
            self.fetch.is_loading()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        name: String,
    }

    impl Item {
        fn new(id: u32, name: &str) -> Self {
            Self {
                id,
                name: name.to_string(),
            }
        }
    }

    impl Record for Item {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }
    }

    #[derive(Default)]
    struct MockSource {
        items: Mutex<Vec<Item>>,
        queries: Mutex<Vec<Query>>,
        reject: Mutex<Option<SaveError>>,
        creates: AtomicUsize,
        updates: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl MockSource {
        fn with_items(count: u32) -> Arc<Self> {
            let source = Self::default();
            *source.items.lock().unwrap() =
                (1..=count).map(|id| Item::new(id, &format!("item {id}"))).collect();
            Arc::new(source)
        }

        fn lists(&self) -> usize {
            self.queries.lock().unwrap().len()
        }

        fn last_query(&self) -> Query {
            self.queries.lock().unwrap().last().cloned().unwrap()
        }

        fn save(&self, row: Item) -> SaveResult<Item> {
            if let Some(error) = self.reject.lock().unwrap().take() {
                return Err(error);
            }
            let mut items = self.items.lock().unwrap();
            items.retain(|i| i.id != row.id);
            items.push(row.clone());
            items.sort_by_key(|i| i.id);
            Ok(row)
        }
    }

    #[async_trait]
    impl DataSource for MockSource {
        type Row = Item;

        async fn list(&self, query: Query) -> Page<Item> {
            self.queries.lock().unwrap().push(query.clone());
            let items = self.items.lock().unwrap();
            Page {
                rows: items.iter().skip(query.offset()).take(query.page_size).cloned().collect(),
                count: items.len(),
            }
        }

        async fn create(&self, row: Item) -> SaveResult<Item> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.save(row)
        }

        async fn update(&self, row: Item) -> SaveResult<Item> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.save(row)
        }

        async fn delete(&self, row: Item) -> SaveResult<Item> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.items.lock().unwrap().retain(|i| i.id != row.id);
            Ok(row)
        }
    }

    /// Saves a fixed row for New, or the edited row renamed, on Enter.
    struct StubForm(Option<Item>);

    impl EditForm for StubForm {
        type Row = Item;

        fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<FormEvent<Item>>> {
            Ok(match key.code {
                KeyCode::Enter => {
                    let row = self.0.clone().map_or_else(
                        || Item::new(99, "new item"),
                        |row| Item::new(row.id, "renamed"),
                    );
                    FormEvent::Save(row).into()
                }
                KeyCode::Esc => FormEvent::Close.into(),
                _ => EventResult::Ignored,
            })
        }

        fn render(&mut self, _: &mut Frame, _: Rect, _: &Theme, _: &FormErrors) {}
    }

    fn options() -> DataTableOptions<Item> {
        let columns = vec![
            Column::new("Id", "id", |i: &Item| i.id.into()),
            Column::new("Name", "name", |i: &Item| Value::from(i.name.as_str())).sortable(false),
        ];
        let form: FormFactory<Item> =
            Box::new(|row: Option<&Item>| {
                Box::new(StubForm(row.cloned())) as Box<dyn EditForm<Row = Item>>
            });
        DataTableOptions::new(columns, form).page_size(5)
    }

    fn table(source: &Arc<MockSource>) -> DataTable<MockSource> {
        DataTable::new(Arc::clone(source), options(), Arc::new(KeyResolver::default()))
    }

    fn draw(table: &mut DataTable<MockSource>) {
        let mut terminal = Terminal::new(TestBackend::new(70, 14)).unwrap();
        terminal
            .draw(|frame| table.render(frame, frame.area(), &Theme::default()))
            .unwrap();
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn click(table: &mut DataTable<MockSource>, x: u16, y: u16) {
        table
            .handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), x, y))
            .unwrap();
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Run update and every command it returns until nothing is left.
    async fn settle(table: &mut DataTable<MockSource>) {
        loop {
            match table.update() {
                UpdateResult::Idle => break,
                UpdateResult::Commands(commands) => {
                    for command in commands {
                        command.execute().await.unwrap();
                    }
                }
            }
        }
    }

    async fn mounted(count: u32) -> (Arc<MockSource>, DataTable<MockSource>) {
        let source = MockSource::with_items(count);
        let mut table = table(&source);
        settle(&mut table).await;
        (source, table)
    }

    #[tokio::test]
    async fn test_mount_fetches_first_page() {
        let (source, table) = mounted(8).await;
        assert_eq!(source.lists(), 1);
        let query = source.last_query();
        assert_eq!((query.page_number, query.page_size), (1, 5));
        assert_eq!(query.search, None);
        assert_eq!(query.order_by, None);
        assert_eq!(table.rows().len(), 5);
        assert_eq!(table.window().range_text(), "1-5 of 8");
    }

    #[tokio::test]
    async fn test_paging_follows_enablement() {
        let (source, mut table) = mounted(8).await;

        table.queue(TableMsg::PrevPage);
        settle(&mut table).await;
        assert_eq!(source.lists(), 1);

        table.queue(TableMsg::NextPage);
        settle(&mut table).await;
        assert_eq!(table.window().range_text(), "6-8 of 8");
        assert_eq!(table.rows().len(), 3);

        table.queue(TableMsg::NextPage);
        settle(&mut table).await;
        assert_eq!(source.lists(), 2);
    }

    #[tokio::test]
    async fn test_changes_in_one_cycle_fetch_once() {
        let (source, mut table) = mounted(8).await;
        table.queue(TableMsg::NextPage);
        table.queue(TableMsg::SubmitSearch("item".into()));
        table.queue(TableMsg::SortColumn(0));
        settle(&mut table).await;

        assert_eq!(source.lists(), 2);
        let query = source.last_query();
        assert_eq!(query.page_number, 2);
        assert_eq!(query.search.as_deref(), Some("item"));
        assert_eq!(query.order_by, Some(OrderBy::ascending("id")));
    }

    #[tokio::test]
    async fn test_sort_toggles_and_skips_unsortable() {
        let (source, mut table) = mounted(3).await;

        for expected in ["id", "-id", "id"] {
            table.handle_key(key(KeyCode::Char('s'))).unwrap();
            settle(&mut table).await;
            assert_eq!(table.order_by().unwrap().to_string(), expected);
        }
        let fetches = source.lists();

        table.handle_key(key(KeyCode::Char('l'))).unwrap();
        table.handle_key(key(KeyCode::Char('s'))).unwrap();
        settle(&mut table).await;
        assert_eq!(table.order_by().unwrap().to_string(), "id");
        assert_eq!(source.lists(), fetches);
    }

    #[tokio::test]
    async fn test_unchanged_search_does_not_refetch() {
        let (source, mut table) = mounted(3).await;
        table.queue(TableMsg::SubmitSearch("item".into()));
        settle(&mut table).await;
        table.queue(TableMsg::SubmitSearch("item".into()));
        settle(&mut table).await;
        assert_eq!(source.lists(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_rows() {
        let (source, mut table) = mounted(3).await;
        table.queue(TableMsg::Refresh);
        settle(&mut table).await;
        table.queue(TableMsg::Refresh);
        settle(&mut table).await;
        assert_eq!(source.lists(), 3);
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.count(), 3);
    }

    #[tokio::test]
    async fn test_stale_page_is_discarded() {
        let (source, mut table) = mounted(2).await;

        table.queue(TableMsg::Refresh);
        let UpdateResult::Commands(mut first) = table.update() else {
            panic!("expected a fetch");
        };
        table.queue(TableMsg::Refresh);
        let UpdateResult::Commands(mut second) = table.update() else {
            panic!("expected a fetch");
        };

        second.remove(0).execute().await.unwrap();
        settle(&mut table).await;
        source.items.lock().unwrap().push(Item::new(3, "late"));
        first.remove(0).execute().await.unwrap();
        settle(&mut table).await;

        assert_eq!(table.rows().len(), 2);
        assert!(!table.is_loading());
    }

    #[tokio::test]
    async fn test_save_new_row_closes_and_refetches() {
        let (source, mut table) = mounted(3).await;
        table.handle_key(key(KeyCode::Char('n'))).unwrap();
        settle(&mut table).await;
        assert!(table.captures_input());

        table.handle_key(key(KeyCode::Enter)).unwrap();
        settle(&mut table).await;

        assert!(!table.overlay.is_open());
        assert_eq!(source.creates.load(Ordering::SeqCst), 1);
        assert_eq!(source.updates.load(Ordering::SeqCst), 0);
        assert_eq!(source.lists(), 2);
        assert!(table.rows().iter().any(|i| i.id == 99));
    }

    #[tokio::test]
    async fn test_save_edited_row_updates() {
        let (source, mut table) = mounted(3).await;
        table.handle_key(key(KeyCode::Down)).unwrap();
        table.handle_key(key(KeyCode::Char('e'))).unwrap();
        settle(&mut table).await;
        table.handle_key(key(KeyCode::Enter)).unwrap();
        settle(&mut table).await;

        assert_eq!(source.updates.load(Ordering::SeqCst), 1);
        assert_eq!(source.creates.load(Ordering::SeqCst), 0);
        assert_eq!(table.rows()[1], Item::new(2, "renamed"));
        // Cursor stays on the edited row.
        assert_eq!(table.grid.selected(), Some(1));
    }

    #[tokio::test]
    async fn test_field_errors_keep_overlay_open() {
        let (source, mut table) = mounted(3).await;
        table.queue(TableMsg::OpenNew);
        settle(&mut table).await;

        *source.reject.lock().unwrap() = Some(SaveError::field("name", "Name is required"));
        table.handle_key(key(KeyCode::Enter)).unwrap();
        settle(&mut table).await;
        let errors = table.overlay.errors().unwrap();
        assert_eq!(errors.field("name"), Some("Name is required"));

        *source.reject.lock().unwrap() = Some(SaveError::field("sku", "Sku is taken"));
        table.handle_key(key(KeyCode::Enter)).unwrap();
        settle(&mut table).await;
        let errors = table.overlay.errors().unwrap();
        assert_eq!(errors.field("name"), None);
        assert_eq!(errors.field("sku"), Some("Sku is taken"));

        assert!(table.overlay.is_open());
        assert_eq!(source.lists(), 1);
    }

    #[tokio::test]
    async fn test_confirmed_delete_refetches_once() {
        let (source, mut table) = mounted(3).await;
        table.handle_key(key(KeyCode::Char('d'))).unwrap();
        settle(&mut table).await;
        assert_eq!(source.deletes.load(Ordering::SeqCst), 0);

        table.handle_key(key(KeyCode::Char('y'))).unwrap();
        settle(&mut table).await;
        assert_eq!(source.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(source.lists(), 2);
        assert_eq!(table.count(), 2);
    }

    #[tokio::test]
    async fn test_declined_delete_does_nothing() {
        let (source, mut table) = mounted(3).await;
        table.handle_key(key(KeyCode::Char('d'))).unwrap();
        settle(&mut table).await;
        table.handle_key(key(KeyCode::Char('n'))).unwrap();
        settle(&mut table).await;

        assert_eq!(source.deletes.load(Ordering::SeqCst), 0);
        assert_eq!(source.lists(), 1);
        assert!(!table.captures_input());
    }

    #[tokio::test]
    async fn test_deleting_last_row_of_page_steps_back() {
        let (source, mut table) = mounted(6).await;
        table.queue(TableMsg::NextPage);
        settle(&mut table).await;
        assert_eq!(table.rows().len(), 1);

        table.handle_key(key(KeyCode::Char('d'))).unwrap();
        settle(&mut table).await;
        table.handle_key(key(KeyCode::Char('y'))).unwrap();
        settle(&mut table).await;

        assert_eq!(source.last_query().page_number, 1);
        assert_eq!(table.window().range_text(), "1-5 of 5");
    }

    #[tokio::test]
    async fn test_keyboard_resize_changes_only_rendered_width() {
        let (_, mut table) = mounted(1).await;
        let declared = table.columns[0].width;
        table.handle_key(key(KeyCode::Char('+'))).unwrap();
        table.handle_key(key(KeyCode::Char('+'))).unwrap();
        table.handle_key(key(KeyCode::Char('-'))).unwrap();
        assert_eq!(table.resize.widths()[0], declared + 1);
        assert_eq!(table.columns[0].width, declared);
    }

    #[tokio::test]
    async fn test_renders_toolbar_grid_and_pager() {
        let (_, mut table) = mounted(8).await;
        let mut terminal = Terminal::new(TestBackend::new(70, 14)).unwrap();
        terminal
            .draw(|frame| table.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();

        assert!(screen.contains("New"));
        assert!(screen.contains("Search"));
        assert!(screen.contains("item 5"));
        assert!(!screen.contains("item 6"));
        assert!(screen.contains("1-5 of 8"));
    }

    #[tokio::test]
    async fn test_result_of_cancelled_form_skips_reopened_form() {
        let (source, mut table) = mounted(3).await;
        table.queue(TableMsg::OpenNew);
        settle(&mut table).await;

        *source.reject.lock().unwrap() = Some(SaveError::field("name", "Name is required"));
        table.handle_key(key(KeyCode::Enter)).unwrap();
        let UpdateResult::Commands(mut pending) = table.update() else {
            panic!("expected a save");
        };
        table.handle_key(key(KeyCode::Esc)).unwrap();
        table.queue(TableMsg::OpenNew);
        settle(&mut table).await;

        pending.remove(0).execute().await.unwrap();
        settle(&mut table).await;

        assert!(table.overlay.is_open());
        assert!(table.overlay.errors().unwrap().is_empty());
        assert_eq!(source.lists(), 1);
    }

    #[tokio::test]
    async fn test_save_finishing_after_cancel_still_refetches() {
        let (source, mut table) = mounted(3).await;
        table.queue(TableMsg::OpenNew);
        settle(&mut table).await;

        table.handle_key(key(KeyCode::Enter)).unwrap();
        let UpdateResult::Commands(mut pending) = table.update() else {
            panic!("expected a save");
        };
        table.handle_key(key(KeyCode::Esc)).unwrap();
        settle(&mut table).await;
        assert!(!table.overlay.is_open());

        pending.remove(0).execute().await.unwrap();
        settle(&mut table).await;

        assert_eq!(source.creates.load(Ordering::SeqCst), 1);
        assert_eq!(source.lists(), 2);
        assert!(table.rows().iter().any(|i| i.id == 99));
        assert!(!table.overlay.is_open());
    }

    #[tokio::test]
    async fn test_dropdown_selection_refetches_with_filter() {
        let source = MockSource::with_items(3);
        let picked = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&picked);
        let dropdown = DropdownFilter::new(
            "stock",
            vec![DropdownOption::new("All", ""), DropdownOption::new("In stock", "true")],
        )
        .on_select(move |value| sink.lock().unwrap().push(value.to_string()));
        let mut table = DataTable::new(
            Arc::clone(&source),
            options().dropdown(dropdown),
            Arc::new(KeyResolver::default()),
        );
        settle(&mut table).await;
        assert_eq!(
            source.last_query().filter,
            Some(BTreeMap::from([("stock".to_string(), String::new())]))
        );

        table.handle_key(key(KeyCode::Char('f'))).unwrap();
        settle(&mut table).await;
        assert_eq!(*picked.lock().unwrap(), vec!["true".to_string()]);
        assert_eq!(source.lists(), 2);
        assert_eq!(
            source.last_query().filter,
            Some(BTreeMap::from([("stock".to_string(), "true".to_string())]))
        );

        table.queue(TableMsg::SelectFilter(1));
        settle(&mut table).await;
        assert_eq!(picked.lock().unwrap().len(), 1);
        assert_eq!(source.lists(), 2);
    }

    #[tokio::test]
    async fn test_header_click_sorts() {
        let (source, mut table) = mounted(3).await;
        draw(&mut table);
        let id = table.grid.column_rect(0);

        click(&mut table, id.x, id.y);
        settle(&mut table).await;
        assert_eq!(table.order_by().unwrap().to_string(), "id");

        click(&mut table, id.x, id.y);
        settle(&mut table).await;
        assert_eq!(table.order_by().unwrap().to_string(), "-id");

        let name = table.grid.column_rect(1);
        click(&mut table, name.x, name.y);
        settle(&mut table).await;
        assert_eq!(table.order_by().unwrap().to_string(), "-id");
        assert_eq!(source.lists(), 3);
    }

    #[tokio::test]
    async fn test_dragging_resize_handle() {
        let (_, mut table) = mounted(3).await;
        draw(&mut table);
        let declared = table.resize.widths()[0];
        let id = table.grid.column_rect(0);
        let handle = id.right();

        click(&mut table, handle, id.y);
        assert!(table.resize.is_dragging());
        let drag = MouseEventKind::Drag(MouseButton::Left);
        table.handle_mouse(mouse(drag, handle + 2, id.y)).unwrap();
        table.handle_mouse(mouse(drag, handle + 3, id.y)).unwrap();
        assert_eq!(table.resize.widths()[0], declared + 3);

        let released = table
            .handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), handle + 3, id.y))
            .unwrap();
        assert_eq!(released, EventResult::Consumed);
        assert!(!table.resize.is_dragging());

        let stray = table.handle_mouse(mouse(drag, handle + 9, id.y)).unwrap();
        assert_eq!(stray, EventResult::Ignored);
        assert_eq!(table.resize.widths()[0], declared + 3);
        assert_eq!(table.columns[0].width, declared);
    }

    #[tokio::test]
    async fn test_pager_clicks_follow_enablement() {
        let (source, mut table) = mounted(8).await;
        draw(&mut table);
        let (prev, next) = (table.pager.prev, table.pager.next);

        click(&mut table, prev.x, prev.y);
        settle(&mut table).await;
        assert_eq!(source.lists(), 1);

        click(&mut table, next.x, next.y);
        settle(&mut table).await;
        assert_eq!(table.window().range_text(), "6-8 of 8");
        assert_eq!(source.lists(), 2);

        draw(&mut table);
        let next = table.pager.next;
        click(&mut table, next.x, next.y);
        settle(&mut table).await;
        assert_eq!(source.lists(), 2);
    }

    #[tokio::test]
    async fn test_paste_goes_to_focused_search() {
        let (source, mut table) = mounted(8).await;
        assert!(!table.handle_paste("item 7"));

        table.handle_key(key(KeyCode::Char('/'))).unwrap();
        assert!(table.handle_paste("item 7"));
        table.handle_key(key(KeyCode::Enter)).unwrap();
        settle(&mut table).await;
        assert_eq!(source.last_query().search.as_deref(), Some("item 7"));

        table.queue(TableMsg::OpenNew);
        settle(&mut table).await;
        assert!(!table.handle_paste("ignored"));
        assert_eq!(source.lists(), 2);
    }
}
