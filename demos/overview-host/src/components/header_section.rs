use overview_dispatch::test_subj;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use super::Component;

pub const TITLE_SUBJ: &str = "header-section-title";
pub const SUBTITLE_SUBJ: &str = "header-panel-subtitle";

/// Panel header: a title line and a subtitle line.
pub struct HeaderSection;

pub struct HeaderSectionProps<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
}

impl HeaderSection {
    pub const HEIGHT: u16 = 2;
}

impl Component for HeaderSection {
    type Props<'a> = HeaderSectionProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

        test_subj(TITLE_SUBJ, chunks[0]);
        let title = Line::styled(props.title, Style::default().fg(Color::White).bold());
        frame.render_widget(Paragraph::new(title), chunks[0]);

        test_subj(SUBTITLE_SUBJ, chunks[1]);
        let subtitle = Line::styled(props.subtitle, Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(subtitle), chunks[1]);
    }
}
