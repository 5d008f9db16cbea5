//! Modal prompts on the live terminal
//!
//! The engine asks questions synchronously, so each prompt runs its own
//! small draw/read loop until the player confirms or backs out.

use crate::data::Severity;
use crate::game::{Notice, Prompter};
use crate::tui::widgets::ToastLine;
use crate::tui::{centered_rect, styled_block, Theme};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::warn;

/// Most notices kept for the toast area
const MAX_NOTICES: usize = 50;

/// How a modal was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalExit {
    Submit,
    Cancel,
}

/// An open prompt and what the player has entered so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Text {
        title: String,
        prompt: String,
        input: String,
    },
    Choice {
        title: String,
        prompt: String,
        options: Vec<String>,
        selected: usize,
    },
}

impl Modal {
    pub fn text(title: &str, prompt: &str) -> Self {
        Modal::Text {
            title: title.to_string(),
            prompt: prompt.to_string(),
            input: String::new(),
        }
    }

    pub fn choice(title: &str, prompt: &str, options: &[String]) -> Self {
        Modal::Choice {
            title: title.to_string(),
            prompt: prompt.to_string(),
            options: options.to_vec(),
            selected: 0,
        }
    }

    /// Apply one key press. `Some` closes the modal.
    pub fn key(&mut self, code: KeyCode) -> Option<ModalExit> {
        if code == KeyCode::Esc {
            return Some(ModalExit::Cancel);
        }
        match self {
            Modal::Text { input, .. } => match code {
                KeyCode::Enter => return Some(ModalExit::Submit),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            },
            Modal::Choice { options, selected, .. } => match code {
                KeyCode::Enter if !options.is_empty() => return Some(ModalExit::Submit),
                KeyCode::Up => *selected = selected.saturating_sub(1),
                KeyCode::Down if *selected + 1 < options.len() => *selected += 1,
                KeyCode::Char(c) => {
                    // 1-9 picks directly
                    if let Some(i) = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1)) {
                        if i < options.len() {
                            *selected = i;
                            return Some(ModalExit::Submit);
                        }
                    }
                }
                _ => {}
            },
        }
        None
    }

    fn render(&self, frame: &mut Frame, theme: &Theme, notices: &[Notice]) {
        let area = frame.area();
        let (title, prompt, body_height) = match self {
            Modal::Text { title, prompt, .. } => (title, prompt, 3),
            Modal::Choice { title, prompt, options, .. } => {
                (title, prompt, options.len() as u16 + 2)
            }
        };
        let prompt_height = prompt.lines().count() as u16 + 1;
        let popup = centered_rect(64, prompt_height + body_height + 4, area);
        frame.render_widget(Clear, popup);

        let block = styled_block(title, theme);
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(prompt_height),
                Constraint::Min(body_height),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(prompt.as_str())
                .style(Style::default().fg(theme.fg))
                .wrap(Wrap { trim: false }),
            chunks[0],
        );

        match self {
            Modal::Text { input, .. } => {
                let line = Line::from(vec![
                    Span::styled("> ", Style::default().fg(theme.accent)),
                    Span::styled(
                        input.as_str(),
                        Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled("█", Style::default().fg(theme.accent)),
                ]);
                frame.render_widget(
                    Paragraph::new(line).block(styled_block("Resposta", theme)),
                    chunks[1],
                );
            }
            Modal::Choice { options, selected, .. } => {
                let items: Vec<ListItem> = options
                    .iter()
                    .enumerate()
                    .map(|(i, o)| ListItem::new(format!("{}. {}", i + 1, o)))
                    .collect();
                let mut state = ListState::default();
                state.select(Some(*selected));
                let list = List::new(items)
                    .highlight_style(
                        Style::default()
                            .fg(theme.accent)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                    )
                    .highlight_symbol("→ ");
                frame.render_stateful_widget(list, chunks[1], &mut state);
            }
        }

        frame.render_widget(
            Paragraph::new("Enter confirmar | Esc cancelar")
                .style(Style::default().fg(theme.border))
                .alignment(Alignment::Center),
            chunks[2],
        );

        if let Some(notice) = notices.last() {
            let y = popup.y + popup.height;
            if y < area.height {
                frame.render_widget(ToastLine::new(notice), Rect::new(popup.x, y, popup.width, 1));
            }
        }
    }
}

/// Add a notice, dropping the oldest past the cap
pub fn push_notice(notices: &mut Vec<Notice>, notice: Notice) {
    notices.push(notice);
    if notices.len() > MAX_NOTICES {
        let excess = notices.len() - MAX_NOTICES;
        notices.drain(..excess);
    }
}

/// [`Prompter`] that draws modals on the terminal and files notices as
/// toasts
pub struct TerminalPrompter<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    theme: &'a Theme,
    notices: &'a mut Vec<Notice>,
}

impl<'a, B: Backend> TerminalPrompter<'a, B> {
    pub fn new(
        terminal: &'a mut Terminal<B>,
        theme: &'a Theme,
        notices: &'a mut Vec<Notice>,
    ) -> Self {
        Self { terminal, theme, notices }
    }

    /// Draw and read keys until the modal closes. Terminal failures count
    /// as a cancel.
    fn run(&mut self, mut modal: Modal) -> Option<Modal> {
        loop {
            let theme = self.theme;
            let notices = self.notices.as_slice();
            if let Err(e) = self.terminal.draw(|frame| modal.render(frame, theme, notices)) {
                warn!("Failed to draw prompt: {e}");
                return None;
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    match modal.key(key.code) {
                        Some(ModalExit::Submit) => return Some(modal),
                        Some(ModalExit::Cancel) => return None,
                        None => {}
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Failed to read key: {e}");
                    return None;
                }
            }
        }
    }
}

impl<B: Backend> Prompter for TerminalPrompter<'_, B> {
    fn ask_text(&mut self, title: &str, prompt: &str) -> Option<String> {
        match self.run(Modal::text(title, prompt))? {
            Modal::Text { input, .. } => Some(input),
            Modal::Choice { .. } => None,
        }
    }

    fn choose(&mut self, title: &str, prompt: &str, options: &[String]) -> Option<usize> {
        if options.is_empty() {
            return None;
        }
        match self.run(Modal::choice(title, prompt, options))? {
            Modal::Choice { selected, .. } => Some(selected),
            Modal::Text { .. } => None,
        }
    }

    fn notify(&mut self, severity: Severity, message: &str) {
        push_notice(self.notices, Notice::new(severity, message));
    }
}
