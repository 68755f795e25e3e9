//! Notifications emitted while a theme is applied

use crate::log::ApplicationLog;
use reskin_theme::ThemeDepth;

/// Stage of an apply run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Materialize,
    Metadata,
    Variables,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ThemeEvent {
    Started { theme: String, depth: ThemeDepth },
    /// One more node finished within a phase
    Progress { phase: Phase, done: usize, total: usize },
    LogUpdated(ApplicationLog),
    ThemeApplied { theme: String },
}

/// Receiver for apply notifications (UI, CLI progress, tests)
pub trait ApplyListener {
    fn on_event(&self, event: &ThemeEvent);
}

impl<F: Fn(&ThemeEvent)> ApplyListener for F {
    fn on_event(&self, event: &ThemeEvent) {
        self(event)
    }
}

/// Listener that drops every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl ApplyListener for NoopListener {
    fn on_event(&self, _event: &ThemeEvent) {}
}
