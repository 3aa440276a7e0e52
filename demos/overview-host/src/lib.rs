//! Host events overview widget
//!
//! Library portion of the demo, exposed so integration tests can mount the
//! widget through [`harness::OverviewHostHarness`].

pub mod action;
pub mod app;
pub mod components;
pub mod effect;
pub mod harness;
pub mod mock;
pub mod query;
pub mod reducer;
pub mod state;
