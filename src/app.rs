use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::{debug, error, info};

use crate::Theme;
use crate::commands::Command;
use crate::config::{GlobalAction, KeyResolver};
use crate::table::{DataSource, DataTable, UpdateResult};
use crate::tui::{Event, Tui};
use crate::ui::{Component, Keybinding, StatusBar};

/// Top-level application: a title line, one table, and the hint bar.
pub struct App<S: DataSource> {
    title: String,
    table: DataTable<S>,
    theme: Theme,
    resolver: Arc<KeyResolver>,
    should_quit: bool,
    should_suspend: bool,
}

impl<S: DataSource> App<S> {
    pub fn new(
        title: impl Into<String>,
        table: DataTable<S>,
        theme: Theme,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self {
            title: title.into(),
            table,
            theme,
            resolver,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(60.0, 4.0)?;
        tui.enter()?;

        loop {
            if let Some(event) = tui.next_event().await {
                self.handle_event(&mut tui, event)?;
            }
            self.update();

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        info!("Shutting down");
        Ok(())
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Quit => self.should_quit = true,
            Event::Suspend => self.should_suspend = true,
            Event::Tick => self.table.handle_tick(),
            Event::Render => {
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => {
                self.table.handle_mouse(mouse)?;
            }
            Event::Paste(text) => {
                self.table.handle_paste(&text);
            }
            Event::Error(message) => error!(%message, "Terminal event error"),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.table.handle_key(key)?.is_consumed() {
            return Ok(());
        }
        // Typing into the search box or a form must never quit.
        if !self.table.captures_input() && self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        }
        Ok(())
    }

    /// Let the table process queued messages and spawn whatever it asks for.
    fn update(&mut self) {
        if let UpdateResult::Commands(commands) = self.table.update() {
            for command in commands {
                spawn(command);
            }
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let [title, body, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.render_title(frame, title);
        self.table.render(frame, body, &self.theme);

        let mut keybindings = self.table.keybindings();
        if !self.table.captures_input() {
            keybindings.push(Keybinding::new(
                self.resolver.display_global(GlobalAction::Quit),
                "Quit",
            ));
        }
        StatusBar::render(frame, hints, &self.theme, &keybindings);
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(32)]).areas(area);
        let mut title = vec![
            Span::styled(
                " lazytable ",
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("› {}", self.title), Style::default().fg(self.theme.text())),
        ];
        if let Some(order) = self.table.order_by() {
            title.push(Span::styled(
                format!("  sorted by {order}"),
                Style::default().fg(self.theme.muted()),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(title)), left);

        let count = Line::from(format!("{} rows ", self.table.count()))
            .style(Style::default().fg(self.theme.muted()))
            .right_aligned();
        frame.render_widget(Paragraph::new(count), right);
    }
}

fn spawn(command: Box<dyn Command>) {
    let name = command.name();
    debug!(command = %name, "Spawning command");
    tokio::spawn(async move {
        if let Err(e) = command.execute().await {
            error!(command = %name, error = %e, "Command failed");
        }
    });
}
