//! Terminal User Interface
//!
//! Screens for the detective game using ratatui

pub mod app;
pub mod prompter;
pub mod widgets;

pub use app::App;
pub use prompter::TerminalPrompter;

use crate::data::Severity;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme for the game
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub border: Color,
    pub header: Color,
    pub gold: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            border: Color::DarkGray,
            header: Color::Magenta,
            gold: Color::LightYellow,
        }
    }
}

/// Get color for severity level
pub fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Info => Color::Gray,
        Severity::Ok => Color::Green,
        Severity::Warn => Color::Yellow,
        Severity::Danger => Color::Red,
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// A rectangle of the given size centered in `area`, clipped to it
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// ASCII art logo
pub const LOGO: &str = r#"
 ____  _               _            _      ____  _
/ ___|| |__   ___ _ __| | ___   ___| | __ | __ )(_) __ _
\___ \| '_ \ / _ \ '__| |/ _ \ / __| |/ / |  _ \| |/ _` |
 ___) | | | |  __/ |  | | (_) | (__|   <  | |_) | | (_| |
|____/|_| |_|\___|_|  |_|\___/ \___|_|\_\ |____/|_|\__,_|

            🔍  Mistérios na escola  🔍
"#;

/// Smaller logo for header
pub const SMALL_LOGO: &str = " 🔍 SHERLOCK BIA ";

/// Help text
pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════════╗
║                     CONTROLOS                     ║
╠═══════════════════════════════════════════════════╣
║  ↑/↓    Navegar nas listas                        ║
║  Enter  Escolher / Confirmar                      ║
║  Esc    Voltar / Cancelar                         ║
║  ?      Mostrar ou esconder esta ajuda            ║
║  q      Sair (no hub)                             ║
╠═══════════════════════════════════════════════════╣
║                       NO HUB                      ║
╠═══════════════════════════════════════════════════╣
║  h      Árvore de habilidades                     ║
║  p      Painel dos pais                           ║
║  f      Letra grande                              ║
║  n      Narração                                  ║
║  r      Repetir o caso selecionado                ║
╠═══════════════════════════════════════════════════╣
║                      NO CASO                      ║
╠═══════════════════════════════════════════════════╣
║  i      Inventário                                ║
║  d      Dica inteligente                          ║
║  l      Lupa mágica (revela tudo por um tempo)    ║
║  a      Acusar                                    ║
╠═══════════════════════════════════════════════════╣
║               JOGO DAS DIFERENÇAS                 ║
╠═══════════════════════════════════════════════════╣
║  ←↑↓→   Mover a lupa      Enter  Clicar           ║
╠═══════════════════════════════════════════════════╣
║                  PAINEL DOS PAIS                  ║
╠═══════════════════════════════════════════════════╣
║  r      Apagar todo o progresso                   ║
╚═══════════════════════════════════════════════════╝
"#;

/// Create the main layout
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(3),   // Toasts
            Constraint::Length(1),   // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Create the case layout (scene + side panel)
pub fn create_content_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65),  // Scene
            Constraint::Percentage(35),  // Actions
        ])
        .split(area)
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered_rect(60, 6, area);
        assert_eq!(popup, Rect::new(0, 2, 40, 6));
    }
}
