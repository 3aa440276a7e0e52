//! Test subjects: stable identifiers for rendered regions
//!
//! A component calls [`test_subj`] with an identifier and the area it is
//! about to draw into. Outside of a capture this is a no-op. The
//! [`RenderHarness`](crate::testing::RenderHarness) opens a capture around
//! each render so tests can look regions up by identifier instead of by
//! screen position.

use std::cell::RefCell;

use ratatui::layout::Rect;

/// A tagged region recorded during a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub id: &'static str,
    pub area: Rect,
}

thread_local! {
    static CAPTURE: RefCell<Option<Vec<Subject>>> = const { RefCell::new(None) };
}

/// Tag `area` with the identifier `id` for the render in progress.
pub fn test_subj(id: &'static str, area: Rect) {
    CAPTURE.with(|capture| {
        if let Some(subjects) = capture.borrow_mut().as_mut() {
            subjects.push(Subject { id, area });
        }
    });
}

/// Run `f` while recording every [`test_subj`] call made on this thread.
///
/// Captures nest: an inner capture sees only its own subjects and the outer
/// one resumes afterwards.
pub fn capture_subjects<R>(f: impl FnOnce() -> R) -> (R, Vec<Subject>) {
    let outer = CAPTURE.with(|capture| capture.borrow_mut().replace(Vec::new()));
    let result = f();
    let subjects = CAPTURE.with(|capture| {
        let mut slot = capture.borrow_mut();
        let subjects = slot.take().unwrap_or_default();
        *slot = outer;
        subjects
    });
    (result, subjects)
}
