use crate::console::LineBuffer;
use crate::ui::app::App;
use crate::ui::footer::Footer;
use crate::ui::header::Header;
use crate::ui::layout::layout_regions;
use ratatui::layout::{Position, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();
    let (header, body, footer) = layout_regions(area);

    let context = app.context();
    let header_widget = Header::new(
        app.session_state(),
        context.workspace.as_deref(),
        context.file.as_deref(),
        app.build_running(),
    );
    frame.render_widget(header_widget.widget(), header);

    frame.render_widget(Clear, body);
    let view = visible_lines(app.console().buffer(), body);
    let cursor = view.cursor;
    frame.render_widget(Paragraph::new(view.lines), body);
    if let Some((x, y)) = cursor {
        frame.set_cursor_position(Position::new(x, y));
    }

    let footer_widget = Footer::new(app.last_error());
    frame.render_widget(footer_widget.widget(footer), footer);
}

struct View {
    lines: Vec<Line<'static>>,
    cursor: Option<(u16, u16)>,
}

/// The tail of the buffer that fits `area`, with the caret on the last line.
fn visible_lines(buffer: &LineBuffer, area: Rect) -> View {
    if area.width == 0 || area.height == 0 {
        return View {
            lines: Vec::new(),
            cursor: None,
        };
    }
    let width = area.width as usize;
    let height = area.height as usize;

    let all: Vec<&str> = buffer.text().split('\n').collect();
    let start = all.len().saturating_sub(height);
    let last = all.len() - 1;

    let caret_column = buffer.caret_column();
    // Scroll the input line sideways so the caret stays on screen.
    let skip = (caret_column + 1).saturating_sub(width);

    let lines = all[start..]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let skip = if start + offset == last { skip } else { 0 };
            Line::from(printable(line, skip))
        })
        .collect::<Vec<_>>();

    let x = area.x + (caret_column - skip) as u16;
    let y = area.y + (last - start) as u16;
    View {
        lines,
        cursor: Some((x, y)),
    }
}

/// Control characters are shown, not interpreted.
fn printable(line: &str, skip: usize) -> String {
    line.trim_end_matches('\r')
        .chars()
        .skip(skip)
        .map(|c| match c {
            '\t' => ' ',
            c if (c as u32) < 0x20 => char::from_u32(0x2400 + c as u32).unwrap_or('?'),
            '\u{7f}' => '\u{2421}',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_tail_and_puts_cursor_after_prompt() {
        let mut buffer = LineBuffer::new("PS> ");
        buffer.append_output("one\ntwo\nthree\n");
        buffer.insert("ls");
        let view = visible_lines(&buffer, Rect::new(0, 3, 40, 2));
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[1], Line::from("PS> ls"));
        assert_eq!(view.cursor, Some((6, 4)));
    }

    #[test]
    fn long_input_scrolls_sideways() {
        let mut buffer = LineBuffer::new("> ");
        buffer.insert("abcdefghij");
        let view = visible_lines(&buffer, Rect::new(0, 0, 5, 1));
        assert_eq!(view.lines[0], Line::from("ghij"));
        assert_eq!(view.cursor, Some((4, 0)));
    }

    #[test]
    fn escape_sequences_are_shown_literally() {
        assert_eq!(printable("\u{1b}[31mred\r", 0), "\u{241b}[31mred");
    }
}
