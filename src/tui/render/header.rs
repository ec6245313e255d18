use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode;

/// Render the two header rows: app title with theme on the right, then the
/// active view query and note count
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let title = " TODO LIST";
    let theme_label = format!("{} ", app.theme_mode);
    let mut top = vec![Span::styled(
        title,
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let used = unicode::display_width(title) + unicode::display_width(&theme_label);
    if used < width {
        top.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        top.push(Span::styled(
            theme_label,
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let shown = app.visible_notes().len();
    let total = app.store.len();
    let count = if shown == total {
        format!("{} note{}", total, if total == 1 { "" } else { "s" })
    } else {
        format!("{} of {}", shown, total)
    };
    let query = unicode::truncate_to_width(&app.query.to_string(), width.saturating_sub(20));
    let bottom = Line::from(vec![
        Span::styled(
            format!(" {}", query),
            Style::default().fg(app.theme.text).bg(bg),
        ),
        Span::styled(
            format!("  \u{00B7}  {}", count),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(top), bottom]).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
