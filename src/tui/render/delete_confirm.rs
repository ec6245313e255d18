use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, Overlay};
use crate::util::unicode;

use super::centered_rect_fixed;

/// Render the delete confirmation popup
pub fn render_delete_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.overlay {
        Some(Overlay::DeleteConfirm { id }) => match app.store.get(id) {
            Some(note) => note.title.as_str(),
            None => return,
        },
        _ => return,
    };

    let bg = app.theme.background;
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let bright_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let title_w = (popup_w as usize).saturating_sub(14);

    let lines = vec![
        Line::from(Span::styled("", text_style)),
        Line::from(vec![
            Span::styled("  Delete \"", text_style),
            Span::styled(unicode::truncate_to_width(title, title_w), bright_style),
            Span::styled("\"?", text_style),
        ]),
        Line::from(Span::styled("", text_style)),
        Line::from(vec![
            Span::styled("  y", dim_style),
            Span::styled(" delete  ", text_style),
            Span::styled("n", dim_style),
            Span::styled(" cancel", text_style),
        ]),
    ];

    let popup_h = (lines.len() as u16) + 2;
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(Span::styled(
            " Delete Note ",
            Style::default()
                .fg(app.theme.red)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, overlay_area);
}
