//! Single-line input overlay for the folder and GitHub URL prompts.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// What the typed text will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Folder,
    GithubUrl,
}

impl PromptKind {
    fn title(self) -> &'static str {
        match self {
            PromptKind::Folder => "Open folder",
            PromptKind::GithubUrl => "GitHub URL",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct PromptState {
    kind: Option<PromptKind>,
    input: String,
}

impl PromptState {
    /// Reveal the prompt with `initial` prefilled.
    pub fn open_with<S: Into<String>>(&mut self, kind: PromptKind, initial: S) {
        self.kind = Some(kind);
        self.input = initial.into();
    }

    pub fn close(&mut self) {
        self.kind = None;
        self.input.clear();
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }

    pub fn kind(&self) -> Option<PromptKind> {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Close the prompt, returning its kind and the typed text.
    pub fn submit(&mut self) -> Option<(PromptKind, String)> {
        let kind = self.kind.take()?;
        Some((kind, std::mem::take(&mut self.input)))
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }
}

#[derive(Debug, Default)]
pub struct Prompt;

impl Prompt {
    /// Draw the prompt if it is visible.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &PromptState) {
        let Some(kind) = state.kind else {
            return;
        };

        let width = area.width.saturating_sub(10).min(80);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + area.height.saturating_sub(4) / 2,
            width,
            height: 3.min(area.height),
        };

        frame.render_widget(Clear, popup);
        let input = Paragraph::new(format!("{}▏", state.input()))
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .title(format!("{} · enter to confirm, esc to cancel", kind.title()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(input, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn submit_returns_typed_text_and_closes() {
        let mut state = PromptState::default();
        state.open_with(PromptKind::Folder, "/tm");
        state.push_char('p');
        state.push_char('x');
        state.pop_char();

        assert_eq!(state.input(), "/tmp");
        assert_eq!(
            state.submit(),
            Some((PromptKind::Folder, "/tmp".to_string()))
        );
        assert!(!state.is_open());
        assert_eq!(state.submit(), None);
    }

    #[test]
    fn renders_only_when_open() {
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        let mut state = PromptState::default();
        terminal
            .draw(|frame| {
                let area = frame.size();
                Prompt.render(frame, area, &state);
            })
            .unwrap();
        assert!(terminal.backend().buffer().content().iter().all(|cell| cell.symbol() == " "));

        state.open_with(PromptKind::GithubUrl, "https://github.com/acme/shop");
        terminal
            .draw(|frame| {
                let area = frame.size();
                Prompt.render(frame, area, &state);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("GitHub URL"));
        assert!(text.contains("https://github.com/acme/shop"));
    }
}
