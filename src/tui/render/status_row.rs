use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode;

const KEY_HINTS: &str = "n new  e edit  space done  d delete  / search  f filter  t theme  q quit";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = if let Some(status) = &app.status {
        let color = if status.is_error {
            app.theme.red
        } else {
            app.theme.green
        };
        Line::from(Span::styled(
            unicode::truncate_to_width(&format!(" {}", status.text), width),
            Style::default().fg(color).bg(bg),
        ))
    } else if app.mode == Mode::Search && app.active_overlay().is_none() {
        // Search prompt: /pattern▌
        let mut spans = vec![
            Span::styled(
                format!("/{}", app.search_input),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ),
            Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
        ];
        push_right_hint(&mut spans, "Enter keep  Esc clear", width, app);
        Line::from(spans)
    } else if app.unsaved {
        Line::from(Span::styled(
            " unsaved changes  R retry",
            Style::default().fg(app.theme.red).bg(bg),
        ))
    } else if app.config.ui.show_key_hints {
        Line::from(Span::styled(
            unicode::truncate_to_width(&format!(" {}", KEY_HINTS), width),
            Style::default().fg(app.theme.dim).bg(bg),
        ))
    } else {
        Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg)))
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn push_right_hint(spans: &mut Vec<Span<'static>>, hint: &'static str, width: usize, app: &App) {
    let bg = app.theme.background;
    let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    let hint_width = unicode::display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn render_row(app: &App, w: u16) -> String {
        render_to_string(w, 1, |frame, area| {
            render_status_row(frame, app, area);
        })
    }

    #[test]
    fn navigate_mode_shows_key_hints() {
        let app = app_with_notes(&[]);
        assert_eq!(render_row(&app, 100), format!(" {}", KEY_HINTS));
    }

    #[test]
    fn key_hints_can_be_disabled() {
        let mut app = app_with_notes(&[]);
        app.config.ui.show_key_hints = false;
        assert_eq!(render_row(&app, 40), "");
    }

    #[test]
    fn search_prompt_with_hint() {
        let mut app = app_with_notes(&[]);
        app.start_search();
        app.search_input = "milk".into();
        let expected = format!("/milk\u{258C}{}Enter keep  Esc clear", " ".repeat(19));
        assert_eq!(render_row(&app, 46), expected);
    }

    #[test]
    fn status_message_wins() {
        let mut app = app_with_notes(&[]);
        app.set_error("missing required field: title");
        assert_eq!(render_row(&app, 60), " missing required field: title");
    }

    #[test]
    fn unsaved_changes_offer_retry() {
        let mut app = app_with_notes(&[]);
        app.unsaved = true;
        assert_eq!(render_row(&app, 60), " unsaved changes  R retry");
    }
}
