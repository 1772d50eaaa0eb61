use crate::shell::SessionState;
use crate::ui::theme::{
    GLOBAL_BORDER, HEADER_SEPARATOR, HEADER_TEXT, STATUS_ERROR, STATUS_OK, STATUS_PENDING,
};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use std::path::Path;

pub struct Header<'a> {
    state: SessionState,
    workspace: Option<&'a Path>,
    file: Option<&'a Path>,
    building: bool,
}

impl<'a> Header<'a> {
    pub fn new(
        state: SessionState,
        workspace: Option<&'a Path>,
        file: Option<&'a Path>,
        building: bool,
    ) -> Self {
        Self {
            state,
            workspace,
            file,
            building,
        }
    }

    pub fn widget(&self) -> Paragraph<'static> {
        let text_style = Style::default().fg(HEADER_TEXT);
        let separator_style = Style::default().fg(HEADER_SEPARATOR);
        let status_style = Style::default().fg(state_color(self.state));

        let mut spans = vec![
            Span::styled("  ", text_style),
            Span::styled("●", status_style),
            Span::styled(" shell ", text_style),
            Span::styled(self.state.label().to_string(), status_style),
            Span::styled("  │  ", separator_style),
            Span::styled(format!("workspace: {}", display_or_none(self.workspace)), text_style),
            Span::styled("  │  ", separator_style),
            Span::styled(format!("file: {}", display_or_none(self.file)), text_style),
        ];
        if self.building {
            spans.push(Span::styled("  │  ", separator_style));
            spans.push(Span::styled("building…", Style::default().fg(STATUS_PENDING)));
        }

        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::TOP | Borders::BOTTOM)
                .border_style(Style::default().fg(GLOBAL_BORDER)),
        )
    }
}

fn state_color(state: SessionState) -> Color {
    match state {
        SessionState::Running => STATUS_OK,
        SessionState::Starting => STATUS_PENDING,
        SessionState::Stopped | SessionState::Exited => STATUS_ERROR,
    }
}

fn display_or_none(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}
