//! Component trait for pure UI elements

use ratatui::{layout::Rect, Frame};

/// A pure UI component that renders based on props
///
/// Components follow these rules:
/// 1. Props contain ALL read-only data needed for rendering
/// 2. `render` is a pure function of props
/// 3. Data (query results included) reaches a component only through props;
///    components never issue queries themselves
///
/// Regions that tests need to find should be tagged with
/// [`test_subj`](crate::subject::test_subj) while rendering.
///
/// # Example
///
/// ```ignore
/// use overview_dispatch::{test_subj, Component, Frame, Rect};
///
/// struct Title;
///
/// struct TitleProps<'a> {
///     text: &'a str,
/// }
///
/// impl Component for Title {
///     type Props<'a> = TitleProps<'a>;
///
///     fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
///         test_subj("header-section-title", area);
///         frame.render_widget(Paragraph::new(props.text), area);
///     }
/// }
/// ```
pub trait Component {
    /// Data required to render the component (read-only)
    type Props<'a>;

    /// Render the component to the frame
    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>);
}
