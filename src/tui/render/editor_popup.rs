use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, EditorField, Overlay};
use crate::util::unicode;

use super::centered_rect_fixed;

/// Render the note editor form
pub fn render_editor_popup(frame: &mut Frame, app: &App, area: Rect) {
    let heading = match &app.overlay {
        Some(Overlay::Editor { editing: None }) => " New Note ",
        Some(Overlay::Editor { editing: Some(_) }) => " Edit Note ",
        _ => return,
    };

    let bg = app.theme.background;
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);
    let label_focus = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let cursor_style = Style::default().fg(app.theme.highlight).bg(bg);

    let popup_w: u16 = 60.min(area.width.saturating_sub(2));
    let value_w = (popup_w as usize).saturating_sub(6);

    let mut lines: Vec<Line> = Vec::new();
    for field in EditorField::ALL {
        let focused = app.editor.focus == field;
        lines.push(Line::from(Span::styled(
            format!(" {}", field.label()),
            if focused { label_focus } else { dim_style },
        )));

        let value = app.editor.field(field);
        let mut spans = vec![Span::styled("  ", text_style)];
        if focused {
            // Keep the cursor visible by dropping text from the left
            let cursor = app.editor.cursor.min(value.len());
            let (before, after) = value.split_at(cursor);
            let before = tail_to_width(before, value_w.saturating_sub(1));
            let after_w = value_w.saturating_sub(unicode::display_width(before) + 1);
            spans.push(Span::styled(before.to_string(), text_style));
            spans.push(Span::styled("\u{258C}", cursor_style));
            spans.push(Span::styled(
                unicode::truncate_to_width(after, after_w),
                text_style,
            ));
        } else {
            spans.push(Span::styled(
                unicode::truncate_to_width(value, value_w),
                text_style,
            ));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(Span::styled("", text_style)));
    }

    lines.push(Line::from(vec![
        Span::styled(" Tab", dim_style),
        Span::styled(" next  ", text_style),
        Span::styled("Enter", dim_style),
        Span::styled(" save  ", text_style),
        Span::styled("Esc", dim_style),
        Span::styled(" cancel", text_style),
    ]));

    let popup_h = (lines.len() as u16) + 2;
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(Span::styled(
            heading,
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, overlay_area);
}

/// Longest suffix of `s` that fits in `max_cells`
fn tail_to_width(s: &str, max_cells: usize) -> &str {
    let mut start = s.len();
    let mut width = 0;
    while let Some(prev) = unicode::prev_grapheme_boundary(s, start) {
        let w = unicode::display_width(&s[prev..start]);
        if width + w > max_cells {
            break;
        }
        width += w;
        start = prev;
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn new_note_form_shows_fields_and_hints() {
        let mut app = app_with_notes(&[]);
        app.open_new_editor();
        app.editor.draft.title = "Buy milk".into();
        app.editor.cursor = app.editor.draft.title.len();
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_editor_popup(frame, &app, area);
        });
        assert!(output.contains("New Note"));
        assert!(output.contains("Title"));
        assert!(output.contains("Buy milk\u{258C}"));
        assert!(output.contains("Description"));
        assert!(output.contains("Due"));
        assert!(output.contains("Esc cancel"));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let mut app = app_with_notes(&sample_notes());
        app.open_edit_editor();
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_editor_popup(frame, &app, area);
        });
        assert!(output.contains("Edit Note"));
        assert!(output.contains("Buy milk"));
        assert!(output.contains("2024-01-01T10:00"));
    }

    #[test]
    fn tail_keeps_end_of_text() {
        assert_eq!(tail_to_width("hello world", 5), "world");
        assert_eq!(tail_to_width("hi", 5), "hi");
        assert_eq!(tail_to_width("abc", 0), "");
    }
}
