use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn binding<'a>(keys: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {:<10}", keys), Style::default().fg(Color::Yellow)),
        Span::raw(action),
    ])
}

pub fn render(frame: &mut Frame) {
    let area = super::centered_rect(70, 60, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(""),
        heading("  Global"),
        binding("?", "Toggle this help"),
        binding("q", "Quit application"),
        binding("Ctrl+C", "Quit application"),
        Line::from(""),
        heading("  List View"),
        binding("↑/k ↓/j", "Navigate up/down"),
        binding("PgUp/PgDn", "Previous/next page"),
        binding("g/G", "Jump to first/last page"),
        binding("/", "Start searching (filters on every key)"),
        binding("Esc", "Reset the search"),
        binding("Enter", "Open poster detail"),
        Line::from(""),
        heading("  Detail View"),
        binding("↑/↓", "Scroll content"),
        binding("PgUp/PgDn", "Scroll page up/down"),
        binding("Esc/q", "Back to the list"),
        Line::from(""),
    ];

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(Line::from(" Press any key to close ").style(Style::default().fg(Color::DarkGray))),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}
