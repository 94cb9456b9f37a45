use crate::app::{App, InputMode};
use crate::fetch::Fetch;
use crate::store::KeyValueStore;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn render<S: KeyValueStore, F: Fetch>(app: &App<S, F>, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(3) + filter(3) + list(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let header_text = format!(" Poster Catalog   [{} posters]", app.visible.len());
    let header = Paragraph::new(header_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    // ── Filter bar ──
    let filter_style = match app.input_mode {
        InputMode::Editing => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default().fg(Color::DarkGray),
    };
    let filter_label = if app.input_mode == InputMode::Editing {
        " Search (Enter/Esc to finish): "
    } else {
        " Search (/): "
    };
    let filter_text = format!("{}{}", filter_label, app.filter);
    let filter_bar = Paragraph::new(filter_text)
        .style(filter_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(filter_style)
                .title(" Search "),
        );
    frame.render_widget(filter_bar, chunks[1]);

    // Set cursor position when editing
    if app.input_mode == InputMode::Editing {
        let cursor_x = chunks[1].x + 1 + filter_label.width() as u16 + app.filter.width() as u16;
        let cursor_y = chunks[1].y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    // ── Posters ──
    let title_width = (area.width as usize).saturating_sub(40).max(10);
    let items: Vec<ListItem> = if app.visible.is_empty() {
        vec![ListItem::new(Span::styled(
            " No posters to show. Check that the poster list endpoint is reachable.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.list_items()
            .iter()
            .map(|record| {
                let mut spans = vec![Span::styled(
                    truncate_str(record.display_title(), title_width),
                    Style::default().fg(Color::White),
                )];
                if let Some(year) = record.year_text() {
                    spans.push(Span::styled(
                        format!("  {}", year),
                        Style::default().fg(Color::Yellow),
                    ));
                }
                let tags = record.visible_tags();
                if !tags.is_empty() {
                    spans.push(Span::styled(
                        format!("  #{}", tags.join(" #")),
                        Style::default().fg(Color::Magenta),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let page_info = format!(
        " {}-{} of {} ",
        if app.visible.is_empty() { 0 } else { app.list_offset + 1 },
        app.list_offset + app.list_items().len(),
        app.visible.len()
    );

    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Posters ")
                .title_bottom(Line::from(page_info).alignment(Alignment::Right)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    if !app.visible.is_empty() {
        list_state.select(Some(app.list_selected));
    }
    frame.render_stateful_widget(list_widget, chunks[2], &mut list_state);

    // ── Status bar ──
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let status_line = Line::from(vec![
        Span::styled(" ↑↓", key_style),
        Span::raw(" Navigate  "),
        Span::styled("/", key_style),
        Span::raw(" Search  "),
        Span::styled("Esc", key_style),
        Span::raw(" Reset  "),
        Span::styled("Enter", key_style),
        Span::raw(" Detail  "),
        Span::styled("?", key_style),
        Span::raw(" Help  "),
        Span::styled("q", key_style),
        Span::raw(" Quit  "),
        Span::styled(&app.status_msg, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[3]);
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut result = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Nova", 10), "Nova");
        assert_eq!(truncate_str("Wolność bolszewicka", 8), "Wolność…");
        // Wide characters count double
        assert_eq!(truncate_str("ポスター展", 5), "ポス…");
    }
}
