//! Custom widgets for the game UI

use crate::data::{DifferenceGame, DifferenceGameState};
use crate::game::Notice;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// A progress bar for found clues
pub struct ClueMeter {
    found: usize,
    total: usize,
    label: String,
    color: Color,
}

impl ClueMeter {
    pub fn new(label: &str, found: usize, total: usize) -> Self {
        Self {
            found,
            total,
            label: label.to_string(),
            color: Color::Cyan,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Widget for ClueMeter {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        let color = if self.total > 0 && self.found >= self.total {
            Color::Green
        } else {
            self.color
        };

        let label = format!("{}: {}/{}", self.label, self.found, self.total);
        buf.set_string(area.x, area.y, &label, Style::default().fg(color));

        if area.height > 1 {
            let inner = area.width - 2;
            let filled = if self.total == 0 {
                0
            } else {
                (self.found.min(self.total) as u16 * inner) / self.total as u16
            };
            let bar_y = area.y + 1;
            buf.set_string(area.x, bar_y, "[", Style::default());
            buf.set_string(area.x + area.width - 1, bar_y, "]", Style::default());

            for x in 0..filled {
                buf.set_string(area.x + 1 + x, bar_y, "█", Style::default().fg(color));
            }
            for x in filled..inner {
                buf.set_string(area.x + 1 + x, bar_y, "░", Style::default().fg(Color::DarkGray));
            }
        }
    }
}

/// One notice, colored by severity
pub struct ToastLine<'a> {
    notice: &'a Notice,
}

impl<'a> ToastLine<'a> {
    pub fn new(notice: &'a Notice) -> Self {
        Self { notice }
    }
}

impl Widget for ToastLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = crate::tui::severity_color(&self.notice.severity);
        let text = format!("{} {}", self.notice.severity.symbol(), self.notice.message);
        buf.set_stringn(area.x, area.y, &text, area.width as usize, Style::default().fg(color));
    }
}

/// Double-bordered box for the result screen
pub struct ResultBanner {
    title: String,
    content: Vec<String>,
    border_color: Color,
}

impl ResultBanner {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
            border_color: Color::Yellow,
        }
    }

    pub fn content(mut self, lines: Vec<String>) -> Self {
        self.content = lines;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }
}

impl Widget for ResultBanner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let style = Style::default().fg(self.border_color);
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        buf.set_string(area.x, area.y, "╔", style);
        buf.set_string(area.x, bottom, "╚", style);
        for x in area.x + 1..right {
            buf.set_string(x, area.y, "═", style);
            buf.set_string(x, bottom, "═", style);
        }
        buf.set_string(right, area.y, "╗", style);
        buf.set_string(right, bottom, "╝", style);
        for y in area.y + 1..bottom {
            buf.set_string(area.x, y, "║", style);
            buf.set_string(right, y, "║", style);
        }

        let title = format!(" {} ", self.title);
        let title_width = title.chars().count() as u16;
        let title_x = area.x + area.width.saturating_sub(title_width) / 2;
        buf.set_stringn(
            title_x,
            area.y,
            &title,
            area.width as usize,
            style.add_modifier(Modifier::BOLD),
        );

        for (i, line) in self.content.iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= bottom {
                break;
            }
            buf.set_stringn(
                area.x + 2,
                y,
                line,
                area.width.saturating_sub(4) as usize,
                Style::default().fg(Color::White),
            );
        }
    }
}

/// A difference board scaled into the widget area. Found regions are
/// filled; the magnifier marks the cursor.
pub struct BoardView<'a> {
    board: &'a DifferenceGame,
    state: Option<&'a DifferenceGameState>,
    cursor: (f32, f32),
}

impl<'a> BoardView<'a> {
    pub fn new(
        board: &'a DifferenceGame,
        state: Option<&'a DifferenceGameState>,
        cursor: (f32, f32),
    ) -> Self {
        Self { board, state, cursor }
    }

    /// Board coordinates of a cell's center
    fn to_board(&self, area: Rect, col: u16, row: u16) -> (f32, f32) {
        let sx = self.board.width.max(1) as f32 / area.width.max(1) as f32;
        let sy = self.board.height.max(1) as f32 / area.height.max(1) as f32;
        ((col as f32 + 0.5) * sx, (row as f32 + 0.5) * sy)
    }
}

impl Widget for BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let found = self.state.map(|s| s.found_differences.as_slice()).unwrap_or(&[]);
        let sx = area.width as f32 / self.board.width.max(1) as f32;
        let sy = area.height as f32 / self.board.height.max(1) as f32;

        for row in 0..area.height {
            for col in 0..area.width {
                let (bx, by) = self.to_board(area, col, row);
                let hit = self.board.region_at(bx, by);
                let (symbol, color) = match hit {
                    Some(i) if found.contains(&i) => ("█", Color::Green),
                    _ => ("·", Color::DarkGray),
                };
                buf.set_string(area.x + col, area.y + row, symbol, Style::default().fg(color));
            }
        }

        let cx = ((self.cursor.0 * sx) as u16).min(area.width - 1);
        let cy = ((self.cursor.1 * sy) as u16).min(area.height - 1);
        buf.set_string(
            area.x + cx,
            area.y + cy,
            "✚",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Region;

    fn symbol(buf: &Buffer, x: u16, y: u16) -> &str {
        buf[(x, y)].symbol()
    }

    #[test]
    fn meter_fills_proportionally() {
        let area = Rect::new(0, 0, 12, 2);
        let mut buf = Buffer::empty(area);
        ClueMeter::new("Pistas", 1, 2).render(area, &mut buf);
        let bar: String = (1..11).map(|x| symbol(&buf, x, 1)).collect();
        assert_eq!(bar, "█████░░░░░");
    }

    #[test]
    fn board_marks_found_regions() {
        let board = DifferenceGame {
            title: String::new(),
            width: 100,
            height: 100,
            regions: vec![Region { x: 0.0, y: 0.0, width: 50.0, height: 50.0 }],
        };
        let mut state = DifferenceGameState::new(1);
        state.spot(0);
        let area = Rect::new(0, 0, 4, 4);
        let mut buf = Buffer::empty(area);
        BoardView::new(&board, Some(&state), (99.0, 99.0)).render(area, &mut buf);
        assert_eq!(symbol(&buf, 0, 0), "█");
        assert_eq!(symbol(&buf, 2, 0), "·");
        assert_eq!(symbol(&buf, 3, 3), "✚");
    }
}
