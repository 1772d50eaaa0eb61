use crate::ui::theme::{GLOBAL_BORDER, HEADER_TEXT, STATUS_ERROR};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const HINTS: &str = " F5 Compile │ F6 Asm │ F7 Asm+Link │ F8 Program │ F9 All │ Ctrl+C Int │ Ctrl+R Restart │ Ctrl+Q Quit";

pub struct Footer<'a> {
    error: Option<&'a str>,
}

impl<'a> Footer<'a> {
    pub fn new(error: Option<&'a str>) -> Self {
        Self { error }
    }

    pub fn widget(&self, area: Rect) -> Paragraph<'static> {
        let text_style = Style::default().fg(HEADER_TEXT).add_modifier(Modifier::DIM);
        let content_width = area.width.saturating_sub(2) as usize; // minus borders

        let line = match self.error {
            Some(error) => Line::from(vec![Span::styled(
                format!(" {}", error),
                Style::default().fg(STATUS_ERROR),
            )]),
            None => {
                let version = format!("v{} ", VERSION);
                // Char count, not byte count (box drawing characters)
                let padding = content_width
                    .saturating_sub(HINTS.chars().count())
                    .saturating_sub(version.chars().count());
                Line::from(vec![
                    Span::styled(HINTS, text_style),
                    Span::styled(" ".repeat(padding), text_style),
                    Span::styled(version, text_style),
                ])
            }
        };

        Paragraph::new(line)
            .style(text_style)
            .alignment(Alignment::Left)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(GLOBAL_BORDER)),
            )
    }
}
