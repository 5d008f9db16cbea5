//! Main application state and rendering

use crate::data::{PuzzleKind, SessionStatus, Severity, SKILLS};
use crate::game::{format_time, Accusation, CaseView, ClueOutcome, Game, Notice, Prompter, Tick};
use crate::tui::prompter::push_notice;
use crate::tui::widgets::{BoardView, ClueMeter, ResultBanner, ToastLine};
use crate::tui::{centered_rect, create_content_layout, create_main_layout, styled_block};
use crate::tui::{TerminalPrompter, Theme, HELP_TEXT, LOGO, SMALL_LOGO};
use crate::GameError;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Number of toasts shown under the content
const VISIBLE_TOASTS: usize = 3;

/// Cursor steps across a difference board
const BOARD_STEPS: f32 = 24.0;

const HUB_KEYS: &str =
    "↑↓ escolher | Enter abrir | r repetir | h habilidades | p pais | f letra | n narração | q sair";
const CASE_KEYS: &str =
    "↑↓ escolher | Enter agir | i inventário | d dica | l lupa | a acusar | Esc hub";

/// Application state
pub struct App {
    pub game: Game,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    pub show_inventory: bool,
    pub current_screen: Screen,
    pub menu_state: ListState,
    pub notices: Vec<Notice>,
    tick_interval: Duration,
    last_tick: Instant,
}

/// Current screen being displayed
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Welcome,
    Hub,
    Case(String),
    Board {
        case_id: String,
        clue_id: String,
        diff_id: String,
        /// Magnifier position in image coordinates
        cursor: (f32, f32),
    },
    Result(String),
    Parents,
    SkillTree,
}

/// One entry of the case action list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseAction {
    Clue(String),
    Talk(String),
    Accuse,
    Hint,
    PowerUp,
    Inventory,
    Back,
}

fn stars(n: u8) -> String {
    (0..3).map(|i| if i < n { '★' } else { '☆' }).collect()
}

fn puzzle_label(kind: PuzzleKind) -> &'static str {
    match kind {
        PuzzleKind::None => "Examinar",
        PuzzleKind::Cipher => "Cifra",
        PuzzleKind::Pattern => "Sequência",
        PuzzleKind::Difference => "Diferenças",
    }
}

impl App {
    pub fn new(game: Game, tick_interval: Duration) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        Self {
            game,
            theme: Theme::default(),
            running: true,
            show_help: false,
            show_inventory: false,
            current_screen: Screen::Welcome,
            menu_state,
            notices: Vec::new(),
            tick_interval,
            last_tick: Instant::now(),
        }
    }

    fn toast(&mut self, severity: Severity, message: &str) {
        push_notice(&mut self.notices, Notice::new(severity, message));
    }

    /// Run an engine operation that may talk to the player
    fn prompt<B: Backend, R>(
        &mut self,
        terminal: &mut Terminal<B>,
        f: impl FnOnce(&mut Game, &mut dyn Prompter) -> R,
    ) -> R {
        let mut ui = TerminalPrompter::new(terminal, &self.theme, &mut self.notices);
        f(&mut self.game, &mut ui)
    }

    /// Surface an engine error. Shortfalls were already announced by the
    /// engine itself.
    fn report(&mut self, err: GameError) {
        match err {
            GameError::InsufficientCoins { .. } | GameError::SkillAlreadyUnlocked(_) => {}
            GameError::CaseClosed(_) => self.toast(Severity::Info, "Este caso já foi resolvido."),
            GameError::Storage(e) => {
                error!("Failed to save progress: {e}");
                self.toast(Severity::Danger, "Não foi possível guardar o progresso.");
            }
            other => {
                warn!("{other}");
                self.toast(Severity::Danger, &other.to_string());
            }
        }
    }

    fn go_to(&mut self, screen: Screen) {
        self.current_screen = screen;
        self.show_inventory = false;
        self.menu_state.select(Some(0));
    }

    /// Handle keyboard input and the timer
    pub fn handle_input<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> std::io::Result<bool> {
        if self.last_tick.elapsed() >= self.tick_interval {
            self.last_tick = Instant::now();
            self.on_tick();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(true);
                }

                if self.show_help {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                        self.show_help = false;
                    }
                    return Ok(true);
                }
                if self.show_inventory {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('i')) {
                        self.show_inventory = false;
                    }
                    return Ok(true);
                }

                let on_board = matches!(self.current_screen, Screen::Board { .. });
                match key.code {
                    KeyCode::Char('q')
                        if matches!(self.current_screen, Screen::Welcome | Screen::Hub) =>
                    {
                        self.running = false;
                        return Ok(false);
                    }
                    KeyCode::Char('?') => self.show_help = true,
                    KeyCode::Esc => self.handle_escape(),
                    KeyCode::Up if on_board => self.move_cursor(0.0, -1.0),
                    KeyCode::Down if on_board => self.move_cursor(0.0, 1.0),
                    KeyCode::Left if on_board => self.move_cursor(-1.0, 0.0),
                    KeyCode::Right if on_board => self.move_cursor(1.0, 0.0),
                    KeyCode::Up => self.navigate_up(),
                    KeyCode::Down => self.navigate_down(),
                    KeyCode::Enter => self.handle_enter(terminal),
                    KeyCode::Char(c) => self.handle_shortcut(c, terminal),
                    _ => {}
                }
            }
        }
        Ok(self.running)
    }

    fn on_tick(&mut self) {
        let case_id = match &self.current_screen {
            Screen::Case(id) | Screen::Board { case_id: id, .. } => id.clone(),
            _ => return,
        };
        match self.game.tick(&case_id) {
            Ok(Tick::Running { power_up_expired: true, .. }) => {
                self.toast(Severity::Info, "🔦 A lupa mágica acabou.");
            }
            Ok(_) => {}
            Err(e) => self.report(e),
        }
    }

    fn handle_escape(&mut self) {
        match self.current_screen.clone() {
            Screen::Board { case_id, .. } => self.go_to(Screen::Case(case_id)),
            Screen::Case(_) | Screen::Result(_) | Screen::Parents | Screen::SkillTree => {
                self.go_to(Screen::Hub)
            }
            Screen::Welcome | Screen::Hub => {}
        }
    }

    fn list_len(&self) -> usize {
        match &self.current_screen {
            Screen::Hub => self.game.catalog().cases.len(),
            Screen::Case(id) => self
                .game
                .case_view(id)
                .map_or(0, |view| self.case_actions(&view).len()),
            Screen::SkillTree => SKILLS.len(),
            _ => 0,
        }
    }

    fn navigate_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        if i > 0 {
            self.menu_state.select(Some(i - 1));
        }
    }

    fn navigate_down(&mut self) {
        let len = self.list_len();
        let i = self.menu_state.selected().unwrap_or(0);
        if i + 1 < len {
            self.menu_state.select(Some(i + 1));
        }
    }

    fn move_cursor(&mut self, dx: f32, dy: f32) {
        let Screen::Board { diff_id, cursor, .. } = &mut self.current_screen else {
            return;
        };
        let Some(board) = self.game.catalog().difference(diff_id) else {
            return;
        };
        let (w, h) = (board.width as f32, board.height as f32);
        cursor.0 = (cursor.0 + dx * w / BOARD_STEPS).clamp(0.0, (w - 1.0).max(0.0));
        cursor.1 = (cursor.1 + dy * h / BOARD_STEPS).clamp(0.0, (h - 1.0).max(0.0));
    }

    fn handle_enter<B: Backend>(&mut self, terminal: &mut Terminal<B>) {
        let selected = self.menu_state.selected().unwrap_or(0);
        match self.current_screen.clone() {
            Screen::Welcome => self.go_to(Screen::Hub),
            Screen::Hub => {
                let case_id = self.game.catalog().cases.get(selected).map(|c| c.id.clone());
                if let Some(case_id) = case_id {
                    self.open_case(&case_id);
                }
            }
            Screen::Case(case_id) => {
                let action = self
                    .game
                    .case_view(&case_id)
                    .ok()
                    .and_then(|view| self.case_actions(&view).into_iter().nth(selected))
                    .map(|(action, _)| action);
                if let Some(action) = action {
                    self.run_case_action(action, case_id, terminal);
                }
            }
            Screen::Board { case_id, clue_id, cursor, .. } => {
                let outcome = self.prompt(terminal, |game, ui| {
                    game.spot_difference(&case_id, &clue_id, cursor.0, cursor.1, ui)
                });
                match outcome {
                    Ok(ClueOutcome::Found | ClueOutcome::AlreadyHeld) => {
                        self.go_to(Screen::Case(case_id))
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.report(e);
                        self.go_to(Screen::Case(case_id));
                    }
                }
            }
            Screen::Result(_) => self.go_to(Screen::Hub),
            Screen::SkillTree => {
                if let Some(skill) = SKILLS.get(selected) {
                    let outcome = self.prompt(terminal, |game, ui| game.unlock_skill(skill.id, ui));
                    if let Err(e) = outcome {
                        self.report(e);
                    }
                }
            }
            Screen::Parents => {}
        }
    }

    fn handle_shortcut<B: Backend>(&mut self, c: char, terminal: &mut Terminal<B>) {
        match (self.current_screen.clone(), c) {
            (Screen::Hub, 'h') => self.go_to(Screen::SkillTree),
            (Screen::Hub, 'p') => self.go_to(Screen::Parents),
            (Screen::Hub, 'f') => {
                if let Err(e) = self.prompt(terminal, |game, ui| game.toggle_large_font(ui)) {
                    self.report(e);
                }
            }
            (Screen::Hub, 'n') => {
                if let Err(e) = self.prompt(terminal, |game, ui| game.toggle_narration(ui)) {
                    self.report(e);
                }
            }
            (Screen::Hub, 'r') => {
                let selected = self.menu_state.selected().unwrap_or(0);
                let case_id = self.game.catalog().cases.get(selected).map(|c| c.id.clone());
                if let Some(case_id) = case_id {
                    match self.game.replay_case(&case_id) {
                        Ok(_) => self.go_to(Screen::Case(case_id)),
                        Err(e) => self.report(e),
                    }
                }
            }
            (Screen::Case(id), 'i') => self.run_case_action(CaseAction::Inventory, id, terminal),
            (Screen::Case(id), 'd') => self.run_case_action(CaseAction::Hint, id, terminal),
            (Screen::Case(id), 'l') => self.run_case_action(CaseAction::PowerUp, id, terminal),
            (Screen::Case(id), 'a') => self.run_case_action(CaseAction::Accuse, id, terminal),
            (Screen::Parents, 'r') => self.confirm_reset(terminal),
            _ => {}
        }
    }

    /// Solved cases go straight to their result
    fn open_case(&mut self, case_id: &str) {
        if self.game.session(case_id).is_some_and(|s| s.is_solved()) {
            self.go_to(Screen::Result(case_id.to_string()));
            return;
        }
        match self.game.start_case(case_id) {
            Ok(_) => self.go_to(Screen::Case(case_id.to_string())),
            Err(e) => self.report(e),
        }
    }

    fn case_actions(&self, view: &CaseView) -> Vec<(CaseAction, String)> {
        let mut actions: Vec<(CaseAction, String)> = view
            .hotspots
            .iter()
            .map(|h| {
                (
                    CaseAction::Clue(h.clue_id.clone()),
                    format!("{} {}", h.icon, puzzle_label(h.puzzle)),
                )
            })
            .collect();
        actions.extend(
            view.suspects
                .iter()
                .map(|(id, name)| (CaseAction::Talk(id.clone()), format!("💬 Falar com {name}"))),
        );
        actions.push((CaseAction::Accuse, "⚖️ Acusar".to_string()));
        actions.push((CaseAction::Hint, format!("💡 Dica ({} moedas)", view.hint_cost)));
        actions.push((
            CaseAction::PowerUp,
            format!("🔦 Lupa mágica ({} moedas)", self.game.rules().power_up_cost),
        ));
        actions.push((CaseAction::Inventory, "🎒 Inventário".to_string()));
        actions.push((CaseAction::Back, "↩ Voltar".to_string()));
        actions
    }

    fn run_case_action<B: Backend>(
        &mut self,
        action: CaseAction,
        case_id: String,
        terminal: &mut Terminal<B>,
    ) {
        match action {
            CaseAction::Clue(clue_id) => {
                match self.prompt(terminal, |game, ui| game.collect_clue(&case_id, &clue_id, ui)) {
                    Ok(ClueOutcome::Board { diff_id, .. }) => {
                        let cursor = self
                            .game
                            .catalog()
                            .difference(&diff_id)
                            .map_or((0.0, 0.0), |b| (b.width as f32 / 2.0, b.height as f32 / 2.0));
                        self.current_screen = Screen::Board { case_id, clue_id, diff_id, cursor };
                    }
                    Ok(_) => {}
                    Err(e) => self.report(e),
                }
            }
            CaseAction::Talk(suspect_id) => {
                let outcome =
                    self.prompt(terminal, |game, ui| game.talk_to(&case_id, &suspect_id, ui));
                if let Err(e) = outcome {
                    self.report(e);
                }
            }
            CaseAction::Accuse => self.accuse(case_id, terminal),
            CaseAction::Hint => {
                if let Err(e) = self.prompt(terminal, |game, ui| game.request_hint(&case_id, ui)) {
                    self.report(e);
                }
            }
            CaseAction::PowerUp => {
                if let Err(e) = self.prompt(terminal, |game, ui| game.buy_power_up(&case_id, ui)) {
                    self.report(e);
                }
            }
            CaseAction::Inventory => self.show_inventory = true,
            CaseAction::Back => self.go_to(Screen::Hub),
        }
    }

    fn accuse<B: Backend>(&mut self, case_id: String, terminal: &mut Terminal<B>) {
        let suspects: Vec<(String, String)> = match self.game.case(&case_id) {
            Ok(case) => case.suspects.iter().map(|s| (s.id.clone(), s.name.clone())).collect(),
            Err(e) => return self.report(e),
        };
        let names: Vec<String> = suspects.iter().map(|(_, name)| name.clone()).collect();

        let outcome = self.prompt(terminal, |game, ui| {
            match ui.choose("⚖️ Acusação", "Quem é o culpado?", &names) {
                Some(i) => match suspects.get(i) {
                    Some((id, _)) => game.accuse(&case_id, id, ui).map(Some),
                    None => Ok(None),
                },
                None => Ok(None),
            }
        });
        match outcome {
            Ok(Some(Accusation::Solved(_))) => self.go_to(Screen::Result(case_id)),
            Ok(_) => {}
            Err(e) => self.report(e),
        }
    }

    fn confirm_reset<B: Backend>(&mut self, terminal: &mut Terminal<B>) {
        let options = ["Não".to_string(), "Sim, apagar tudo".to_string()];
        let confirmed = self.prompt(terminal, |_, ui| {
            ui.choose(
                "🗑️ Apagar progresso",
                "Tem a certeza? Casos, moedas e medalhas serão perdidos.",
                &options,
            ) == Some(1)
        });
        if !confirmed {
            return;
        }
        match self.game.reset_progress() {
            Ok(()) => {
                self.toast(Severity::Ok, "Progresso apagado.");
                self.go_to(Screen::Hub);
            }
            Err(e) => self.report(e),
        }
    }

    /// Body text style; bold when the large-font setting is on
    fn text_style(&self) -> Style {
        let style = Style::default().fg(self.theme.fg);
        if self.game.profile().settings.large_font {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Render the current screen
    pub fn render(&mut self, frame: &mut Frame) {
        frame.render_widget(Clear, frame.area());
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.bg)),
            frame.area(),
        );

        match self.current_screen.clone() {
            Screen::Welcome => self.render_welcome(frame),
            Screen::Hub => self.render_hub(frame),
            Screen::Case(case_id) => self.render_case(frame, &case_id),
            Screen::Board { case_id, clue_id, diff_id, cursor } => {
                self.render_board(frame, &case_id, &clue_id, &diff_id, cursor)
            }
            Screen::Result(case_id) => self.render_result(frame, &case_id),
            Screen::Parents => self.render_parents(frame),
            Screen::SkillTree => self.render_skill_tree(frame),
        }

        if self.show_inventory {
            if let Screen::Case(case_id) = self.current_screen.clone() {
                self.render_inventory_overlay(frame, &case_id);
            }
        }
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    /// Header, toasts and status bar; returns the content area
    fn render_chrome(&self, frame: &mut Frame, keys: &str) -> Rect {
        let chunks = create_main_layout(frame.area());
        let profile = self.game.profile();

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                SMALL_LOGO,
                Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "| {} | Nível {} | ⭐ {} pontos | 🪙 {} moedas | 🎖️ {}",
                    profile.name,
                    profile.level,
                    profile.points,
                    profile.coins,
                    profile.medals.len()
                ),
                Style::default().fg(self.theme.gold),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.border)),
        );
        frame.render_widget(header, chunks[0]);

        let toast_area = chunks[2];
        let recent = self.notices.iter().rev().take(VISIBLE_TOASTS).rev();
        for (i, notice) in recent.enumerate() {
            let y = toast_area.y + i as u16;
            let line = Rect::new(toast_area.x + 1, y, toast_area.width.saturating_sub(2), 1);
            frame.render_widget(ToastLine::new(notice), line);
        }

        let status = Paragraph::new(format!(" {keys} | ? ajuda | v{} ", crate::VERSION))
            .style(Style::default().fg(self.theme.fg).bg(Color::DarkGray));
        frame.render_widget(status, chunks[3]);

        chunks[1]
    }

    fn render_welcome(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let name = self.game.profile().name.clone();

        if area.height < 20 {
            let title = Paragraph::new("🔍 SHERLOCK BIA 🔍")
                .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center);
            frame.render_widget(title, Rect::new(0, 1, area.width, 1));
        } else {
            let logo_height = LOGO.lines().count() as u16;
            let logo = Paragraph::new(LOGO)
                .style(Style::default().fg(self.theme.accent))
                .alignment(Alignment::Center);
            frame.render_widget(logo, Rect::new(0, 1, area.width, logo_height.min(area.height)));
        }

        let greeting = vec![
            Line::from(Span::styled(
                format!("Olá, detetive {name}!"),
                Style::default().fg(self.theme.gold).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Há mistérios na escola à tua espera."),
            Line::from("Encontra pistas, decifra mensagens e descobre o culpado."),
            Line::from(""),
            Line::from(Span::styled(
                "Enter para começar | q para sair",
                Style::default().fg(self.theme.border),
            )),
        ];
        let lower = Rect::new(0, area.height / 2, area.width, area.height / 2);
        let popup = centered_rect(60, 8, lower);
        frame.render_widget(
            Paragraph::new(greeting)
                .style(self.text_style())
                .alignment(Alignment::Center),
            popup,
        );
    }

    fn render_hub(&mut self, frame: &mut Frame) {
        let content = self.render_chrome(frame, HUB_KEYS);
        let chunks = create_content_layout(content);
        let entries = self.game.hub_entries();

        let items: Vec<ListItem> = entries
            .iter()
            .map(|e| {
                let icon = match e.status {
                    None => "📁",
                    Some(SessionStatus::Open) => "🔎",
                    Some(SessionStatus::Solved) => "✅",
                };
                let rating = e.stars.map(stars).unwrap_or_default();
                ListItem::new(format!("{icon} Cap. {} · {} {rating}", e.chapter, e.title))
            })
            .collect();
        let list = List::new(items)
            .block(styled_block("Casos", &self.theme))
            .style(self.text_style())
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("→ ");
        frame.render_stateful_widget(list, chunks[0], &mut self.menu_state);

        let selected = self.menu_state.selected().unwrap_or(0);
        if let Some(entry) = entries.get(selected) {
            let status = match entry.status {
                None => "Por começar".to_string(),
                Some(SessionStatus::Solved) => "Resolvido".to_string(),
                Some(SessionStatus::Open) => "Em investigação".to_string(),
            };
            let details = vec![
                Line::from(Span::styled(
                    entry.title.clone(),
                    Style::default().fg(self.theme.header).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(entry.description.clone()),
                Line::from(""),
                Line::from(format!("Dificuldade: {}", "🔍".repeat(entry.difficulty as usize))),
                Line::from(format!("Estado: {status}")),
            ];
            frame.render_widget(
                Paragraph::new(details)
                    .style(self.text_style())
                    .wrap(Wrap { trim: true })
                    .block(styled_block("Detalhes", &self.theme)),
                chunks[1],
            );
        }
    }

    fn render_case(&mut self, frame: &mut Frame, case_id: &str) {
        let view = match self.game.case_view(case_id) {
            Ok(view) => view,
            Err(e) => {
                self.report(e);
                self.go_to(Screen::Hub);
                return;
            }
        };
        let actions = self.case_actions(&view);
        if self.menu_state.selected().unwrap_or(0) >= actions.len() {
            self.menu_state.select(Some(actions.len().saturating_sub(1)));
        }

        let content = self.render_chrome(frame, CASE_KEYS);
        let chunks = create_content_layout(content);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(2), Constraint::Length(1)])
            .split(chunks[0]);

        let scene = vec![
            Line::from(Span::styled(
                view.title.clone(),
                Style::default().fg(self.theme.header).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(view.intro.clone()),
            Line::from(""),
            Line::from(Span::styled(
                view.scene.clone(),
                Style::default().fg(self.theme.accent).add_modifier(Modifier::ITALIC),
            )),
        ];
        frame.render_widget(
            Paragraph::new(scene)
                .style(self.text_style())
                .wrap(Wrap { trim: true })
                .block(styled_block("Cena", &self.theme)),
            left[0],
        );

        frame.render_widget(
            ClueMeter::new("Pistas", view.essential_found, view.essential_total)
                .color(self.theme.accent),
            left[1],
        );

        let mut stats = format!(
            "⏱ {}  ❌ Erros: {}  💡 Dicas: {}",
            view.elapsed, view.errors, view.hints
        );
        if let Some(secs) = view.power_up_left {
            stats.push_str(&format!("  🔦 {secs}s"));
        }
        frame.render_widget(
            Paragraph::new(stats).style(Style::default().fg(self.theme.warning)),
            left[2],
        );

        let items: Vec<ListItem> =
            actions.into_iter().map(|(_, label)| ListItem::new(label)).collect();
        let list = List::new(items)
            .block(styled_block("Ações", &self.theme))
            .style(self.text_style())
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("→ ");
        frame.render_stateful_widget(list, chunks[1], &mut self.menu_state);
    }

    fn render_board(
        &mut self,
        frame: &mut Frame,
        case_id: &str,
        clue_id: &str,
        diff_id: &str,
        cursor: (f32, f32),
    ) {
        let content = self.render_chrome(frame, "←↑↓→ mover | Enter clicar | Esc voltar ao caso");
        let Some(board) = self.game.catalog().difference(diff_id) else {
            warn!(case = case_id, clue = clue_id, "board {diff_id} vanished");
            self.report(GameError::BoardNotFound(diff_id.to_string()));
            self.go_to(Screen::Case(case_id.to_string()));
            return;
        };
        let state = self
            .game
            .session(case_id)
            .and_then(|s| s.difference_game_states.get(diff_id));
        let found = state.map_or(0, |s| s.found_differences.len());

        let block = styled_block(&format!("🖼️ {}", board.title), &self.theme);
        let inner = block.inner(content);
        frame.render_widget(block, content);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(2)])
            .split(inner);
        frame.render_widget(BoardView::new(board, state, cursor), chunks[0]);
        frame.render_widget(
            ClueMeter::new("Diferenças", found, board.regions.len()).color(self.theme.success),
            chunks[1],
        );
    }

    fn render_result(&mut self, frame: &mut Frame, case_id: &str) {
        let content = self.render_chrome(frame, "Enter ou Esc para voltar ao hub");
        let title = self
            .game
            .case(case_id)
            .map_or_else(|_| case_id.to_string(), |c| c.title.clone());
        let culprit = self
            .game
            .case(case_id)
            .ok()
            .and_then(|c| c.suspect(&c.solution).map(|s| s.name.clone()))
            .unwrap_or_default();
        let session = self.game.session(case_id);
        let time = format_time(self.game.elapsed(case_id));

        let lines = match session.and_then(|s| s.result) {
            Some(result) => {
                let check = |on: bool| if on { "✔" } else { "✘" };
                vec![
                    format!("Caso: {title}"),
                    format!("Culpado: {culprit}"),
                    String::new(),
                    format!("Estrelas: {}", stars(result.stars)),
                    format!("Pontuação: {}", result.score),
                    format!("Tempo: {time}"),
                    String::new(),
                    format!(
                        "{} Todas as pistas ({} encontradas)",
                        check(result.all_found),
                        result.found_count
                    ),
                    format!("{} Sem erros", check(result.clean)),
                    format!("{} Detetive rápido", check(result.fast)),
                ]
            }
            None => vec![format!("Caso: {title}"), "Ainda sem resultado.".to_string()],
        };
        let height = lines.len() as u16 + 2;
        frame.render_widget(
            ResultBanner::new("🎉 CASO RESOLVIDO 🎉")
                .content(lines)
                .border_color(self.theme.gold),
            centered_rect(56, height, content),
        );
    }

    fn render_parents(&mut self, frame: &mut Frame) {
        let content = self.render_chrome(frame, "r apagar progresso | Esc voltar");
        let rows: Vec<Row> = self
            .game
            .parent_rows()
            .into_iter()
            .map(|r| {
                let status_color = match r.status {
                    SessionStatus::Solved => self.theme.success,
                    SessionStatus::Open => self.theme.warning,
                };
                Row::new(vec![
                    Cell::from(r.date),
                    Cell::from(r.title),
                    Cell::from(r.status.to_string()).style(Style::default().fg(status_color)),
                    Cell::from(r.time),
                    Cell::from(r.errors.to_string()),
                    Cell::from(r.hints.to_string()),
                    Cell::from(r.stars.map(stars).unwrap_or_default()),
                ])
            })
            .collect();

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Min(20),
                Constraint::Length(8),
                Constraint::Length(7),
                Constraint::Length(6),
                Constraint::Length(6),
                Constraint::Length(8),
            ],
        )
        .header(
            Row::new(vec!["Data", "Caso", "Estado", "Tempo", "Erros", "Dicas", "Estrelas"])
                .style(Style::default().fg(self.theme.header).add_modifier(Modifier::BOLD)),
        )
        .style(self.text_style())
        .block(styled_block("👪 Painel dos pais", &self.theme));
        frame.render_widget(table, content);

        if empty {
            let inner = centered_rect(40, 1, content);
            frame.render_widget(
                Paragraph::new("Ainda não há casos jogados.")
                    .style(Style::default().fg(self.theme.border))
                    .alignment(Alignment::Center),
                inner,
            );
        }
    }

    fn render_skill_tree(&mut self, frame: &mut Frame) {
        let content = self.render_chrome(frame, "↑↓ escolher | Enter desbloquear | Esc voltar");
        let items: Vec<ListItem> = self
            .game
            .skill_cards()
            .into_iter()
            .map(|card| {
                let (mark, color) = if card.unlocked {
                    ("✅", self.theme.success)
                } else if card.affordable {
                    ("🪙", self.theme.gold)
                } else {
                    ("🔒", self.theme.border)
                };
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!("{mark} {} {} ({} moedas)", card.icon, card.name, card.cost),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(format!("     {}", card.description)),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(styled_block("🌳 Árvore de habilidades", &self.theme))
            .style(self.text_style())
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("→ ");
        frame.render_stateful_widget(list, content, &mut self.menu_state);
    }

    fn render_inventory_overlay(&mut self, frame: &mut Frame, case_id: &str) {
        let inventory = match self.game.inventory(case_id) {
            Ok(inventory) => inventory,
            Err(e) => {
                self.show_inventory = false;
                self.report(e);
                return;
            }
        };
        let mut lines = vec![Line::from(Span::styled(
            format!(
                "Pistas essenciais: {}/{}",
                inventory.essential_found, inventory.essential_total
            ),
            Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD),
        ))];
        if inventory.essential.is_empty() {
            lines.push(Line::from("  (nenhuma ainda)"));
        }
        lines.extend(inventory.essential.iter().map(|t| Line::from(format!("  🔎 {t}"))));
        if !inventory.bonus.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Confissões",
                Style::default().fg(self.theme.gold).add_modifier(Modifier::BOLD),
            )));
            lines.extend(inventory.bonus.iter().map(|t| Line::from(format!("  🗣️ {t}"))));
        }

        let height = lines.len() as u16 + 4;
        let popup = centered_rect(64, height, frame.area());
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .style(self.text_style())
                .wrap(Wrap { trim: false })
                .block(styled_block("🎒 Inventário", &self.theme)),
            popup,
        );
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = centered_rect(56, HELP_TEXT.lines().count() as u16 + 2, area);

        frame.render_widget(Clear, popup_area);

        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent)),
            );
        frame.render_widget(help, popup_area);
    }
}
