//! Test utilities for overview-dispatch applications
//!
//! - [`RenderHarness`]: render into a `TestBackend` and look regions up by
//!   test subject
//! - [`char_key`] / [`key_event`]: build key events for event-mapping tests
//! - Assertion macros for verifying emitted actions
//!
//! # Example
//!
//! ```ignore
//! use overview_dispatch::testing::RenderHarness;
//!
//! let mut harness = RenderHarness::new(80, 12);
//! let view = harness.render(|frame| widget.render(frame, frame.area(), props));
//!
//! assert_eq!(view.text("header-section-title"), "Host events");
//! ```

use std::fmt::Write as _;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};

use crate::subject::{capture_subjects, Subject};

/// A press event for `code` with no modifiers.
pub fn key_event(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// A press event for a character with no modifiers.
pub fn char_key(c: char) -> KeyEvent {
    key_event(KeyCode::Char(c))
}

/// Renders into an in-memory terminal and records test subjects.
pub struct RenderHarness {
    terminal: Terminal<TestBackend>,
}

impl RenderHarness {
    /// # Panics
    ///
    /// Panics if the test terminal cannot be created.
    pub fn new(width: u16, height: u16) -> Self {
        let backend = TestBackend::new(width, height);
        let terminal = Terminal::new(backend).expect("Failed to create test terminal");
        Self { terminal }
    }

    /// Draw one frame and return what ended up on screen.
    ///
    /// # Panics
    ///
    /// Panics if drawing fails.
    pub fn render(&mut self, f: impl FnOnce(&mut Frame)) -> RenderedView {
        let (completed, subjects) = capture_subjects(|| {
            self.terminal
                .draw(f)
                .map(|completed| completed.buffer.clone())
        });
        let buffer = completed.expect("Failed to draw test frame");
        RenderedView { buffer, subjects }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal.backend_mut().resize(width, height);
    }
}

/// One rendered frame plus the subjects tagged while drawing it.
#[derive(Debug, Clone)]
pub struct RenderedView {
    buffer: Buffer,
    subjects: Vec<Subject>,
}

impl RenderedView {
    /// First region tagged `id`.
    pub fn find(&self, id: &str) -> Option<Element<'_>> {
        self.subjects
            .iter()
            .find(|subject| subject.id == id)
            .map(|subject| Element {
                subject: *subject,
                buffer: &self.buffer,
            })
    }

    /// Every region tagged `id`, in render order.
    pub fn find_all(&self, id: &str) -> Vec<Element<'_>> {
        self.subjects
            .iter()
            .filter(|subject| subject.id == id)
            .map(|subject| Element {
                subject: *subject,
                buffer: &self.buffer,
            })
            .collect()
    }

    /// Text of the first region tagged `id`.
    ///
    /// # Panics
    ///
    /// Panics when nothing was tagged `id`, listing the subjects that were.
    pub fn text(&self, id: &str) -> String {
        match self.find(id) {
            Some(element) => element.text(),
            None => {
                let available: Vec<&str> = self.subjects.iter().map(|s| s.id).collect();
                panic!("no test subject `{id}` rendered; available: {available:?}");
            }
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Whole frame as plain text.
    pub fn to_string_plain(&self) -> String {
        buffer_rect_to_string_plain(&self.buffer, self.buffer.area)
    }
}

/// A tagged region within a [`RenderedView`].
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    subject: Subject,
    buffer: &'a Buffer,
}

impl Element<'_> {
    pub fn id(&self) -> &'static str {
        self.subject.id
    }

    pub fn area(&self) -> Rect {
        self.subject.area
    }

    /// Region text with trailing padding removed from every row and blank
    /// rows trimmed from both ends.
    pub fn text(&self) -> String {
        let raw = buffer_rect_to_string_plain(self.buffer, self.subject.area);
        let rows: Vec<&str> = raw.lines().map(str::trim_end).collect();
        rows.join("\n").trim().to_string()
    }
}

/// Plain text of `area` within `buffer`, one line per row.
///
/// Cells outside the buffer are skipped.
pub fn buffer_rect_to_string_plain(buffer: &Buffer, area: Rect) -> String {
    let area = area.intersection(buffer.area);
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buffer.cell((x, y)) {
                out.push_str(cell.symbol());
            }
        }
        let _ = writeln!(out);
    }
    out
}

/// Assert that an action matching a pattern was emitted.
///
/// # Example
///
/// ```ignore
/// let outcome = map_event(&EventKind::Key(char_key('r')), &state);
/// assert_emitted!(outcome.actions, Action::OverviewHostRefetch);
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Count how many actions match a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::test_subj;
    use ratatui::widgets::Paragraph;

    #[test]
    fn test_char_key() {
        let k = char_key('r');
        assert_eq!(k.code, KeyCode::Char('r'));
        assert_eq!(k.modifiers, KeyModifiers::empty());
        assert_eq!(k.kind, KeyEventKind::Press);
    }

    #[test]
    fn test_render_captures_subjects() {
        let mut harness = RenderHarness::new(20, 3);
        let view = harness.render(|frame| {
            let title = Rect::new(0, 0, 20, 1);
            let subtitle = Rect::new(0, 1, 20, 1);
            test_subj("title", title);
            frame.render_widget(Paragraph::new("Host events"), title);
            test_subj("subtitle", subtitle);
        });

        assert_eq!(view.subjects().len(), 2);
        assert_eq!(view.text("title"), "Host events");
        assert_eq!(view.text("subtitle"), "");
        assert!(view.find("missing").is_none());
    }

    #[test]
    fn test_element_text_trims_rows() {
        let mut harness = RenderHarness::new(10, 4);
        let view = harness.render(|frame| {
            let area = Rect::new(0, 0, 10, 4);
            test_subj("block", area);
            frame.render_widget(Paragraph::new("\n a\n b"), area);
        });

        assert_eq!(view.text("block"), "a\n b");
    }

    #[test]
    fn test_find_all_in_render_order() {
        let mut harness = RenderHarness::new(10, 2);
        let view = harness.render(|_| {
            test_subj("row", Rect::new(0, 0, 10, 1));
            test_subj("row", Rect::new(0, 1, 10, 1));
        });

        let rows = view.find_all("row");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].area().y, 1);
    }

    #[test]
    #[should_panic(expected = "available: [\"title\"]")]
    fn test_text_panics_for_unknown_subject() {
        let mut harness = RenderHarness::new(10, 1);
        let view = harness.render(|_| test_subj("title", Rect::new(0, 0, 10, 1)));
        view.text("subtitle");
    }

    #[test]
    fn test_buffer_rect_clips_to_buffer() {
        let buffer = Buffer::with_lines(["ab", "cd"]);
        let text = buffer_rect_to_string_plain(&buffer, Rect::new(1, 0, 5, 5));
        assert_eq!(text, "b\nd\n");
    }

    #[test]
    fn test_assert_macros() {
        #[derive(Debug, PartialEq)]
        enum TestAction {
            Refetch,
            Fetch(u32),
        }

        let actions = vec![TestAction::Refetch, TestAction::Fetch(16)];
        assert_emitted!(actions, TestAction::Refetch);
        assert_emitted!(actions, TestAction::Fetch(n) if *n == 16);
        assert_not_emitted!(actions, TestAction::Fetch(0));
        assert_eq!(count_emitted!(actions, TestAction::Fetch(_)), 1);
    }
}
