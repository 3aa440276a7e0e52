//! Screen layout and key mapping
//!
//! Shared by the binary and the test harness so both render the same frame.

use crossterm::event::KeyCode;
use overview_dispatch::{EventKind, EventOutcome};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use crate::action::Action;
use crate::components::{Component, HelpBar, HelpBarProps, OverviewHost, OverviewHostProps};
use crate::state::AppState;

#[derive(Default)]
pub struct OverviewUi {
    overview_host: OverviewHost,
    help: HelpBar,
}

impl OverviewUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(area);

        self.overview_host.render(
            frame,
            chunks[0],
            OverviewHostProps {
                state: &state.overview_host,
            },
        );
        self.help.render(frame, chunks[1], HelpBarProps);
    }

    pub fn map_event(&mut self, event: &EventKind, _state: &AppState) -> EventOutcome<Action> {
        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Char('r') => EventOutcome::action(Action::OverviewHostRefetch),
                KeyCode::Char('q') | KeyCode::Esc => EventOutcome::action(Action::Quit),
                _ => EventOutcome::ignored(),
            },
            EventKind::Resize(..) => EventOutcome::ignored().with_render(),
        }
    }
}
