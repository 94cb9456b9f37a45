mod alert;
mod detail;
mod help;
mod list;

use crate::app::{App, View};
use crate::fetch::Fetch;
use crate::store::KeyValueStore;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

/// Top-level render dispatch.
pub fn render<S: KeyValueStore, F: Fetch>(app: &App<S, F>, frame: &mut Frame) {
    match app.view {
        View::List => list::render(app, frame),
        View::Detail => detail::render(app, frame),
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }

    // Blocking alerts cover everything, help included
    if let Some(message) = &app.alert {
        alert::render(frame, message);
    }
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
