use crate::core::config::Config;
use crate::core::error::Result;
use crate::search::backend::SearchBackend;
use crate::search::orchestrator::{SearchOrchestrator, Settlement};
use crate::ui::input::QueryInput;
use crate::ui::results::ResultView;
use crate::ui::suggestions::SuggestionCycle;
use crossterm::cursor;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::block::Title;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::io;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, info};

// TUI configuration constants
const TICK_RATE: Duration = Duration::from_millis(100); // Event poll timeout between completion checks
const PAGE_SCROLL: i32 = 10;                             // Lines moved by PgUp/PgDn
const MOUSE_SCROLL: i32 = 3;                             // Lines moved per wheel step

/// Which part of the screen receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Results,
}

/// Interactive search screen
pub struct SearchTui<B: SearchBackend> {
    config: Config,
    runtime: Handle,

    // Search state
    orchestrator: SearchOrchestrator<B>,
    input: QueryInput,
    view: ResultView,
    suggestions: SuggestionCycle,

    // Screen state
    focus: Focus,
    should_quit: bool,
}

impl<B: SearchBackend> SearchTui<B> {
    /// Searches are spawned on `runtime`; the TUI itself runs on the calling thread.
    pub fn new(config: Config, backend: B, runtime: Handle) -> Self {
        let orchestrator = SearchOrchestrator::new(&config, backend);
        Self {
            config,
            runtime,
            orchestrator,
            input: QueryInput::new(),
            view: ResultView::new(),
            suggestions: SuggestionCycle::new(Instant::now()),
            focus: Focus::Input,
            should_quit: false,
        }
    }

    pub fn input(&self) -> &QueryInput {
        &self.input
    }

    pub fn view(&self) -> &ResultView {
        &self.view
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator<B> {
        &self.orchestrator
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run(&mut self) -> Result<()> {
        info!(
            base_url = %self.config.base_url,
            collection = %self.config.collection_name,
            "starting TUI"
        );

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        // Always restore terminal, even if we early-return with an error.
        struct TerminalRestore;
        impl Drop for TerminalRestore {
            fn drop(&mut self) {
                let _ = disable_raw_mode();
                let mut stdout = io::stdout();
                let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture, cursor::Show);
            }
        }
        let _restore = TerminalRestore;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)?;

        while !self.should_quit {
            self.sync_completions();
            self.suggestions.tick(Instant::now());
            terminal.draw(|f| self.render_ui(f))?;

            if event::poll(TICK_RATE)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => match mouse.kind {
                        MouseEventKind::ScrollDown => self.view.scroll_by(MOUSE_SCROLL),
                        MouseEventKind::ScrollUp => self.view.scroll_by(-MOUSE_SCROLL),
                        _ => {}
                    },
                    _ => {}
                }
            }
        }

        info!("leaving TUI");
        Ok(())
    }

    /// Apply finished searches. Returns true when the result set changed.
    pub fn sync_completions(&mut self) -> bool {
        let mut changed = false;
        for settled in self.orchestrator.poll_completions() {
            // Failures are kept in the search state and shown in the status line.
            if let Ok(Settlement::Applied { .. }) = settled {
                self.view.replace(self.orchestrator.results().to_vec());
                changed = true;
            }
        }
        changed
    }

    /// Submit the current input. Returns true when a request was issued.
    pub fn submit(&mut self) -> bool {
        if self.orchestrator.is_loading() {
            return false;
        }
        match self.input.submit() {
            Some(query) => self.start_search(&query),
            None => false,
        }
    }

    /// Put the visible suggestion into the input and search for it
    pub fn run_suggestion(&mut self) -> bool {
        if self.orchestrator.is_loading() {
            return false;
        }
        let suggestion = self.suggestions.current();
        self.input.change(suggestion);
        self.start_search(suggestion)
    }

    fn start_search(&mut self, query: &str) -> bool {
        match self.orchestrator.dispatch(query, &self.runtime) {
            Ok(id) => {
                debug!(request = id.value(), "search dispatched from TUI");
                true
            }
            Err(e) => {
                debug!(error = %e, "search not dispatched");
                false
            }
        }
    }

    /// The "Try this query" row is shown while idle with nothing to list
    pub fn suggestion_visible(&self) -> bool {
        !self.orchestrator.is_loading() && self.view.is_empty()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Enter => {
                    if self.submit() {
                        self.focus = Focus::Results;
                    }
                }
                KeyCode::Char('u') if ctrl => {
                    // Clearing is disabled while a search is running
                    if !self.input.is_empty() && !self.orchestrator.is_loading() {
                        self.input.clear();
                    }
                }
                KeyCode::Char('t') if ctrl => {
                    if self.suggestion_visible() && self.run_suggestion() {
                        self.focus = Focus::Results;
                    }
                }
                KeyCode::Char(c) if !ctrl => self.input.insert(c),
                KeyCode::Backspace => self.input.backspace(),
                KeyCode::Tab | KeyCode::Down | KeyCode::Esc => {
                    if !self.view.is_empty() {
                        self.focus = Focus::Results;
                    } else if key.code == KeyCode::Esc {
                        self.should_quit = true;
                    }
                }
                _ => {}
            },
            Focus::Results => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Tab | KeyCode::Esc | KeyCode::Char('/') => self.focus = Focus::Input,
                KeyCode::Up | KeyCode::Char('k') => self.view.select_previous(),
                KeyCode::Down | KeyCode::Char('j') => self.view.select_next(),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.view.toggle_selected();
                }
                KeyCode::PageDown => self.view.scroll_by(PAGE_SCROLL),
                KeyCode::PageUp => self.view.scroll_by(-PAGE_SCROLL),
                KeyCode::Char(c) if !ctrl => {
                    // Start a new query quickly by just typing; the running
                    // query stays put until its search settles
                    self.focus = Focus::Input;
                    if !self.orchestrator.is_loading() {
                        self.input.clear();
                        self.input.insert(c);
                    }
                }
                _ => {}
            },
        }
    }

    fn render_ui(&mut self, f: &mut Frame) {
        let size = f.size();
        let background = Block::default().style(Style::default().bg(Color::Rgb(35, 35, 35)));
        f.render_widget(background, size);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(3), // Search bar
                Constraint::Length(2), // Status + suggestion
                Constraint::Min(0),    // Results
                Constraint::Length(2), // Footer (border + text)
            ])
            .split(size);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "codesearch",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} @ {}", self.config.collection_name, self.config.base_url),
                Style::default().fg(Color::DarkGray),
            ),
        ]))
        .alignment(Alignment::Left);
        f.render_widget(title, chunks[0]);

        self.render_search_bar(f, chunks[1]);
        self.render_status(f, chunks[2]);
        self.render_results(f, chunks[3]);
        self.render_footer(f, chunks[4]);
    }

    fn render_search_bar(&self, f: &mut Frame, area: Rect) {
        let loading = self.orchestrator.is_loading();
        let editing = self.focus == Focus::Input;

        let border = if loading {
            Style::default().fg(Color::DarkGray)
        } else if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let button = if loading {
            Span::styled(" Search ", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(
                " Search ",
                Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
            )
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(
                "Query",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ))
            .title(Title::from(button).alignment(Alignment::Right));

        let text = if self.input.is_empty() {
            Span::styled("Enter a query", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(self.input.value().to_string(), Style::default().fg(Color::White))
        };
        f.render_widget(Paragraph::new(Line::from(text)).block(block), area);

        if editing && !loading && area.width > 2 {
            let typed = self.input.value().chars().count() as u16;
            let x = area.x + 1 + typed.min(area.width - 2);
            f.set_cursor(x, area.y + 1);
        }
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        f.render_widget(Paragraph::new(self.status_lines()), area);
    }

    /// Status row, followed by the suggestion row when it is visible
    pub fn status_lines(&self) -> Vec<Line<'static>> {
        let state = self.orchestrator.state();
        let mut lines = Vec::new();

        if state.is_loading() {
            lines.push(Line::from(Span::styled(
                "Fetching data...",
                Style::default().fg(Color::Yellow),
            )));
        } else if let Some(error) = state.last_error() {
            lines.push(Line::from(Span::styled(
                format!("Search failed: {}", error),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        } else if !self.view.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} results", self.view.len()),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    state
                        .last_query()
                        .map(|q| format!(" for \"{}\"", q))
                        .unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        } else if state.last_query().is_some() {
            lines.push(Line::from(Span::styled(
                "No results found. Try a different query.",
                Style::default().fg(Color::White),
            )));
        }

        if self.suggestion_visible() {
            lines.push(Line::from(vec![
                Span::styled("Try this query: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    self.suggestions.current(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
                ),
                Span::styled("  (Ctrl+T)", Style::default().fg(Color::DarkGray)),
            ]));
        }

        lines
    }

    fn render_results(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focus == Focus::Results {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            })
            .title(vec![
                Span::styled("Results", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                Span::raw(format!(" ({})", self.view.len())),
            ]);

        let lines = self.view.render_lines(self.focus == Focus::Results);
        let scroll = self.view.scroll_for(area.height.saturating_sub(2));
        f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };

        let hints = match self.focus {
            Focus::Input => vec![
                key("Enter", Color::Green),
                Span::raw(": Search  "),
                key("Ctrl+U", Color::Cyan),
                Span::raw(": Clear  "),
                key("Tab", Color::Yellow),
                Span::raw(": Results  "),
                key("Ctrl+C", Color::Red),
                Span::raw(": Quit"),
            ],
            Focus::Results => vec![
                key("↑↓", Color::Cyan),
                Span::raw(": Navigate  "),
                key("Enter", Color::Green),
                Span::raw(": Expand/Collapse  "),
                key("PgUp/PgDn", Color::Cyan),
                Span::raw(": Scroll  "),
                key("Tab", Color::Yellow),
                Span::raw(" or "),
                key("/", Color::Yellow),
                Span::raw(": Edit  "),
                key("a-z", Color::Yellow),
                Span::raw(": New query (not q/j/k)  "),
                key("q", Color::Red),
                Span::raw(": Quit"),
            ],
        };

        let footer = Paragraph::new(Line::from(hints))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(footer, area);
    }
}
