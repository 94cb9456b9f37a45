use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame, message: &str) {
    let area = super::centered_rect(60, 25, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![Line::from(""), Line::from(format!("  {}", message))];
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .title(" Error ")
                .title_bottom(
                    Line::from(" Press any key to continue ").style(Style::default().fg(Color::DarkGray)),
                ),
        );
    frame.render_widget(popup, area);
}
