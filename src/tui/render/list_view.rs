use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::model::Note;
use crate::tui::app::App;
use crate::util::unicode;

use super::push_highlighted_spans;

/// Render the note list for the active view query
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let count = app.visible_notes().len();

    if count == 0 {
        let empty = Paragraph::new(" Empty...").style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    // Keep the cursor row on screen
    let height = (area.height as usize).max(1);
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + height {
        app.scroll_offset = app.cursor + 1 - height;
    }
    app.scroll_offset = app.scroll_offset.min(count - 1);

    let search_re = app.active_search_re();
    let width = area.width as usize;
    let lines: Vec<Line> = app
        .visible_notes()
        .into_iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(height)
        .map(|(i, note)| note_line(app, note, i == app.cursor, width, search_re.as_ref()))
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// One list row: checkbox, title, and the due date-time right-aligned
fn note_line<'a>(
    app: &App,
    note: &Note,
    is_cursor: bool,
    width: usize,
    search_re: Option<&Regex>,
) -> Line<'a> {
    let bg = if is_cursor {
        app.theme.selection_bg
    } else {
        app.theme.background
    };

    let (checkbox, check_style) = if note.finish {
        ("[x]", Style::default().fg(app.theme.green).bg(bg))
    } else {
        ("[ ]", Style::default().fg(app.theme.text).bg(bg))
    };
    let mut title_style = Style::default().fg(app.theme.text_bright).bg(bg);
    if note.finish {
        title_style = Style::default()
            .fg(app.theme.dim)
            .bg(bg)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if is_cursor {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    let match_style = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);

    let prefix = format!(" {} ", checkbox);
    let due = format!("  {} ", note.datetime.replacen('T', " ", 1));
    let fixed = unicode::display_width(&prefix) + unicode::display_width(&due);
    let title = unicode::truncate_to_width(&note.title, width.saturating_sub(fixed));

    let mut spans = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(checkbox, check_style),
        Span::styled(" ", Style::default().bg(bg)),
    ];
    push_highlighted_spans(&mut spans, &title, title_style, match_style, search_re);

    let used = fixed + unicode::display_width(&title);
    if used <= width {
        spans.push(Span::styled(
            " ".repeat(width - used),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(due, Style::default().fg(app.theme.dim).bg(bg)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FilterMode;
    use crate::tui::render::test_helpers::*;

    fn render_list(app: &mut App, w: u16, h: u16) -> String {
        render_to_string(w, h, |frame, area| {
            render_list_view(frame, app, area);
        })
    }

    #[test]
    fn empty_view_says_empty() {
        let mut app = app_with_notes(&[]);
        assert_eq!(render_list(&mut app, TERM_W, 5), " Empty...");
    }

    #[test]
    fn filtered_to_nothing_says_empty() {
        let mut app = app_with_notes(&[note("1", "Open", false)]);
        app.set_filter(FilterMode::Finished);
        assert_eq!(render_list(&mut app, TERM_W, 5), " Empty...");
    }

    #[test]
    fn rows_show_checkbox_title_and_due() {
        let mut app = app_with_notes(&sample_notes());
        let output = render_list(&mut app, 40, 5);
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            format!(" [ ] Buy milk{}2024-01-01 10:00", " ".repeat(10))
        );
        assert!(rows[1].starts_with(" [x] Call mom"));
        assert!(rows[2].starts_with(" [ ] Write report"));
    }

    #[test]
    fn long_titles_are_truncated() {
        let mut app = app_with_notes(&[note("1", "An extremely long note title", false)]);
        let output = render_list(&mut app, 30, 1);
        assert_eq!(output, " [ ] An ex\u{2026}  2024-01-01 10:00");
    }

    #[test]
    fn scroll_follows_cursor() {
        let notes: Vec<_> = (0..10)
            .map(|i| note(&i.to_string(), &format!("Note {}", i), false))
            .collect();
        let mut app = app_with_notes(&notes);
        app.cursor = 7;
        let output = render_list(&mut app, TERM_W, 3);
        assert_eq!(app.scroll_offset, 5);
        assert!(output.contains("Note 5"));
        assert!(output.contains("Note 7"));
        assert!(!output.contains("Note 4"));
    }

    #[test]
    fn sorted_view_renders_in_sorted_order() {
        let mut app = app_with_notes(&sample_notes());
        app.set_filter(FilterMode::ZToA);
        let output = render_list(&mut app, TERM_W, 5);
        let rows: Vec<&str> = output.lines().collect();
        assert!(rows[0].contains("Write report"));
        assert!(rows[2].contains("Buy milk"));
    }
}
