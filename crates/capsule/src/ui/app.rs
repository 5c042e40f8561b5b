//! Application loop for the TUI.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::app::export::CopyOutcome;
use crate::app::preview::{PreviewSegment, PreviewService};
use crate::app::session::ProjectSession;
use crate::infra::clipboard::{Clipboard, ClipboardSink};
use crate::infra::config::Config;
use crate::ui::components::file_list::{FileList, FileListState};
use crate::ui::components::navigator::{Navigator, NavigatorState};
use crate::ui::components::preview::Preview;
use crate::ui::components::prompt::{Prompt, PromptKind, PromptState};
use crate::ui::components::staging::Staging;

const TICK_RATE: Duration = Duration::from_millis(120);

/// Primary entry point for running the interactive TUI.
pub struct UiApp {
    config: Config,
    explicit_config: Option<PathBuf>,
    session: ProjectSession,
    preview_service: PreviewService,
    preview: Option<PreviewSegment>,
    preview_scroll: u16,
    files: FileListState,
    navigator: NavigatorState,
    prompt: PromptState,
    clipboard: Box<dyn ClipboardSink>,
    status: Option<StatusMessage>,
    focus: FocusTarget,
    should_quit: bool,
}

impl UiApp {
    /// Open `root` with the given configuration. `explicit_config` is re-applied when another
    /// folder is opened from the prompt.
    pub fn new(root: PathBuf, config: Config, explicit_config: Option<PathBuf>) -> Result<Self> {
        let session = ProjectSession::open(root, &config)?;
        Ok(Self {
            preview_service: PreviewService::from_config(&config),
            files: FileListState::from_scan(session.scan()),
            config,
            explicit_config,
            session,
            preview: None,
            preview_scroll: 0,
            navigator: NavigatorState::default(),
            prompt: PromptState::default(),
            clipboard: Box::new(Clipboard::new()),
            status: None,
            focus: FocusTarget::Files,
            should_quit: false,
        })
    }

    /// Replace the clipboard used by the copy action.
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn session(&self) -> &ProjectSession {
        &self.session
    }

    pub fn set_github_url(&mut self, url: impl Into<String>) {
        self.session.set_github_url(url);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Launch the terminal UI and enter the event loop.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key_event(key)
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn render(&self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(size);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(32),
                Constraint::Min(40),
                Constraint::Length(30),
            ])
            .split(layout[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_chunks[0]);

        self.render_header(frame, layout[0]);

        let open = self.session.current().map(|file| file.name.as_str());
        FileList.render(
            frame,
            left_chunks[0],
            &self.files,
            self.focus == FocusTarget::Files,
            self.session.staged(),
            open,
        );
        Navigator.render(
            frame,
            left_chunks[1],
            &self.navigator,
            self.session.hidden(),
            self.focus == FocusTarget::Structure,
        );

        let focus_preview = self.focus == FocusTarget::Preview;
        if let Some(segment) = &self.preview {
            Preview.render(
                segment,
                self.preview_scroll,
                focus_preview,
                main_chunks[1],
                frame.buffer_mut(),
            );
        } else {
            let placeholder = Paragraph::new("Select a file and press enter")
                .block(
                    Block::default()
                        .title("Preview")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                )
                .style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )
                .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, main_chunks[1]);
        }

        Staging.render(frame, main_chunks[2], self.session.staged());
        self.render_status(frame, layout[2]);
        Prompt.render(frame, size, &self.prompt);
    }

    fn render_header(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut spans = vec![Span::styled(
            self.header_path(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(url) = self.session.github_url() {
            spans.push(Span::styled(
                format!("  ({url})"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// `.../<folder>/<file>` for the open file, `.../<folder>` before one is opened.
    pub fn header_path(&self) -> String {
        let mut header = format!(".../{}", self.files.root_label());
        if let Some(file) = self.session.current() {
            header.push('/');
            header.push_str(&file.name);
        }
        header
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let line = match &self.status {
            Some(status) => {
                let style = match status.level {
                    StatusLevel::Info => Style::default().fg(Color::Gray),
                    StatusLevel::Success => Style::default().fg(Color::Green),
                    StatusLevel::Error => Style::default().fg(Color::Red),
                };
                Line::styled(status.text.clone(), style)
            }
            None => Line::from(vec![
                Span::styled(self.staged_label(), Style::default().fg(Color::Cyan)),
                Span::styled(
                    "  ·  enter open · space hide · a stage · s save · y copy · o folder · g url · tab focus · q quit",
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
        };

        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn staged_label(&self) -> String {
        format!("Files staged: {}", self.session.staged().len())
    }

    /// Text currently shown on the status line.
    pub fn status_text(&self) -> String {
        self.status
            .as_ref()
            .map_or_else(|| self.staged_label(), |status| status.text.clone())
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    /// Dispatch one key press. Action failures end up on the status line.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if let Err(err) = self.dispatch_key(key) {
            tracing::debug!(error = %err, "action failed");
            self.set_status(StatusLevel::Error, format!("{err:#}"));
        }
    }

    fn dispatch_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.prompt.is_open() {
            return self.handle_prompt_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
                self.should_quit = true;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Char('a') => self.stage_current()?,
            KeyCode::Char('s') => self.save_document()?,
            KeyCode::Char('y') => self.copy_document()?,
            KeyCode::Char('o') => {
                let current = self.session.root().display().to_string();
                self.prompt.open_with(PromptKind::Folder, current);
            }
            KeyCode::Char('g') => {
                let current = self.session.github_url().unwrap_or_default().to_owned();
                self.prompt.open_with(PromptKind::GithubUrl, current);
            }
            _ => match self.focus {
                FocusTarget::Files => self.handle_files_key(key)?,
                FocusTarget::Structure => self.handle_structure_key(key)?,
                FocusTarget::Preview => self.handle_preview_key(key),
            },
        }
        Ok(())
    }

    fn handle_files_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.files.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.files.select_previous(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                self.open_selected()?;
                self.focus = FocusTarget::Structure;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_structure_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.navigator.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.navigator.select_previous(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected()?,
            KeyCode::Char('h') | KeyCode::Left => self.focus = FocusTarget::Files,
            _ => {}
        }
        Ok(())
    }

    fn handle_preview_key(&mut self, key: KeyEvent) {
        let last_line = self
            .preview
            .as_ref()
            .map_or(0, |segment| segment.line_count().saturating_sub(1));
        let last_line = u16::try_from(last_line).unwrap_or(u16::MAX);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.preview_scroll = self.preview_scroll.saturating_add(1).min(last_line);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.preview_scroll = self.preview_scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                self.preview_scroll = self.preview_scroll.saturating_add(20).min(last_line);
            }
            KeyCode::PageUp => self.preview_scroll = self.preview_scroll.saturating_sub(20),
            KeyCode::Home => self.preview_scroll = 0,
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.prompt.close(),
            KeyCode::Enter => {
                if let Some((kind, input)) = self.prompt.submit() {
                    self.apply_prompt(kind, input.trim())?;
                }
            }
            KeyCode::Backspace => self.prompt.pop_char(),
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.prompt.push_char(ch);
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_prompt(&mut self, kind: PromptKind, input: &str) -> Result<()> {
        match kind {
            PromptKind::Folder => {
                let root = if input.is_empty() {
                    std::env::current_dir().context("unable to determine working directory")?
                } else {
                    PathBuf::from(input)
                };
                self.open_folder(root)
            }
            PromptKind::GithubUrl => {
                if input.is_empty() {
                    return Ok(());
                }
                self.session.set_github_url(input);
                self.set_status(
                    StatusLevel::Info,
                    "GitHub URL recorded; only local folders can be opened",
                );
                Ok(())
            }
        }
    }

    /// Re-open the session on another folder. Staged files and the open file are discarded.
    pub fn open_folder(&mut self, root: PathBuf) -> Result<()> {
        let config = Config::load_for(&root, self.explicit_config.as_deref())?;
        let mut session = ProjectSession::open(root, &config)?;
        if let Some(url) = self.session.github_url() {
            session.set_github_url(url);
        }

        self.files = FileListState::from_scan(session.scan());
        self.preview_service = PreviewService::from_config(&config);
        self.session = session;
        self.config = config;
        self.preview = None;
        self.preview_scroll = 0;
        self.navigator = NavigatorState::default();
        self.focus = FocusTarget::Files;
        self.set_status(
            StatusLevel::Info,
            format!("Opened {} ({} files)", self.header_path(), self.files.len()),
        );
        Ok(())
    }

    fn open_selected(&mut self) -> Result<()> {
        let Some(name) = self.files.selected_name().map(str::to_owned) else {
            return Ok(());
        };
        let outline = self.session.open_file(&name)?.outline.clone();
        self.navigator = NavigatorState::new(outline);
        self.preview_scroll = 0;
        self.refresh_preview();
        Ok(())
    }

    fn toggle_selected(&mut self) -> Result<()> {
        let Some(entry) = self.navigator.selected_entry().cloned() else {
            return Ok(());
        };
        self.session.toggle(&entry)?;
        self.refresh_preview();
        Ok(())
    }

    fn refresh_preview(&mut self) {
        self.preview = self.session.current().map(|file| {
            self.preview_service.preview(
                &file.name,
                &file.displayed,
                !self.session.hidden().is_empty(),
            )
        });
    }

    fn stage_current(&mut self) -> Result<()> {
        let count = self.session.stage_current()?;
        self.set_status(StatusLevel::Info, format!("Files staged: {count}"));
        Ok(())
    }

    fn save_document(&mut self) -> Result<()> {
        match self.session.save_document()? {
            Some(path) => {
                tracing::debug!(path = %path.display(), "document saved");
                self.set_status(StatusLevel::Success, "Saved to file");
            }
            None => self.set_status(StatusLevel::Info, "Nothing staged"),
        }
        Ok(())
    }

    fn copy_document(&mut self) -> Result<()> {
        match self.session.copy_document(self.clipboard.as_mut())? {
            CopyOutcome::Copied => self.set_status(StatusLevel::Success, "Copied to clipboard"),
            CopyOutcome::NothingStaged => self.set_status(StatusLevel::Info, "Nothing staged"),
            CopyOutcome::Unavailable => {}
        }
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Files,
    Structure,
    Preview,
}

impl FocusTarget {
    fn next(self) -> Self {
        match self {
            FocusTarget::Files => FocusTarget::Structure,
            FocusTarget::Structure => FocusTarget::Preview,
            FocusTarget::Preview => FocusTarget::Files,
        }
    }

    fn previous(self) -> Self {
        match self {
            FocusTarget::Files => FocusTarget::Preview,
            FocusTarget::Structure => FocusTarget::Files,
            FocusTarget::Preview => FocusTarget::Structure,
        }
    }
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(4),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusLevel {
    Info,
    Success,
    Error,
}
