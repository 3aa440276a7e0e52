use overview_dispatch::{test_subj, QueryState};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{Component, HeaderSection, HeaderSectionProps};
use crate::query::OverviewHostData;
use crate::state::OverviewHostState;

pub const OVERVIEW_HOST_TITLE: &str = "Host events";
pub const STATS_SUBJ: &str = "overview-host-stats";

/// Subtitle for a query state: empty until data has loaded.
pub fn subtitle(data: &QueryState<OverviewHostData>) -> String {
    match data {
        QueryState::Loaded(data) => format!("Showing: {} events", data.total()),
        _ => String::new(),
    }
}

/// The Host events panel: header plus per-beat stats.
///
/// A failed query draws the same frame as a pending one; the message stays
/// in state and in the logs.
#[derive(Default)]
pub struct OverviewHost;

pub struct OverviewHostProps<'a> {
    pub state: &'a OverviewHostState,
}

impl Component for OverviewHost {
    type Props<'a> = OverviewHostProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(HeaderSection::HEIGHT),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        let subtitle = subtitle(&props.state.data);
        HeaderSection.render(
            frame,
            chunks[0],
            HeaderSectionProps {
                title: OVERVIEW_HOST_TITLE,
                subtitle: &subtitle,
            },
        );

        if let QueryState::Loaded(data) = &props.state.data {
            test_subj(STATS_SUBJ, chunks[2]);
            frame.render_widget(Paragraph::new(stat_lines(data)), chunks[2]);
        }
    }
}

fn stat_lines(data: &OverviewHostData) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for group in data.groups() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<16}", group.name), Style::default().bold()),
            Span::styled(group.total().to_string(), Style::default().bold()),
        ]));
        for (label, count) in group.stats {
            lines.push(Line::from(vec![
                Span::styled(format!("  {label:<14}"), Style::default().fg(Color::Gray)),
                Span::raw(count.to_string()),
            ]));
        }
    }
    lines
}
