use crate::app::App;
use crate::detail::DetailView;
use crate::fetch::Fetch;
use crate::html::EMPTY_GROUP;
use crate::store::KeyValueStore;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render<S: KeyValueStore, F: Fetch>(app: &App<S, F>, frame: &mut Frame) {
    let area = frame.area();
    let detail = match &app.detail {
        Some(d) => d,
        None => return,
    };

    // Layout: header(4) + content(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Heading ──
    let mut meta_lines = vec![Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(
            detail.heading(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ])];
    if !detail.image_url.is_empty() {
        meta_lines.push(Line::from(vec![
            Span::styled(" Image: ", Style::default().fg(Color::DarkGray)),
            Span::styled(&detail.image_url, Style::default().fg(Color::Blue)),
        ]));
    }

    let meta_block = Paragraph::new(meta_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Poster {} ", detail.id)),
    );
    frame.render_widget(meta_block, chunks[0]);

    // ── Sections ──
    let content = Paragraph::new(section_lines(detail))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title_bottom(
                    Line::from(format!(" scroll: {} ", app.detail_scroll))
                        .alignment(Alignment::Right),
                ),
        );
    frame.render_widget(content, chunks[1]);

    // ── Status bar ──
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let status_line = Line::from(vec![
        Span::styled(" ↑↓/PgUp/PgDn", key_style),
        Span::raw(" Scroll  "),
        Span::styled("Esc", key_style),
        Span::raw(" Back  "),
        Span::styled(&app.status_msg, Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[2]);
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn tag_line(tags: &[String]) -> Line<'_> {
    let mut spans = Vec::new();
    for tag in tags {
        spans.push(Span::styled(
            format!(" {} ", tag),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// The visible sections of a detail view, in page order.
fn section_lines(detail: &DetailView) -> Vec<Line<'_>> {
    let mut lines = Vec::new();

    if let Some(description) = &detail.description {
        lines.push(Line::from(description.as_str()));
        lines.push(Line::from(""));
    }

    if !detail.tags.is_empty() {
        lines.push(section_title("Tags"));
        lines.push(tag_line(&detail.tags));
        lines.push(Line::from(""));
    }

    if let Some(groups) = &detail.tag_groups {
        lines.push(section_title("Elements (tags) from the analysis"));
        for (category, tags) in groups {
            lines.push(Line::from(Span::styled(
                format!("  {}", category),
                Style::default().fg(Color::Yellow),
            )));
            if tags.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("    {}", EMPTY_GROUP),
                    Style::default().fg(Color::DarkGray),
                )));
            } else {
                let mut line = tag_line(tags);
                line.spans.insert(0, Span::raw("   "));
                lines.push(line);
            }
        }
        lines.push(Line::from(""));
    }

    if let Some(research) = &detail.research_description {
        lines.push(section_title("Scientific description"));
        lines.push(Line::from(research.as_str()));
        lines.push(Line::from(""));
    }

    if let Some(url) = &detail.source_url {
        lines.push(Line::from(vec![
            Span::styled("Source: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                url.as_str(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }

    lines
}
