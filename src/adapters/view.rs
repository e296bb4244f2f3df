//! Headless dependency views.
//!
//! Instead of drawing, every view writes what it was told into a shared [`ViewLog`]. Used by
//! the command line front end and by tests to observe jumps, moves and hides.

use crate::domain::ports::{DependencyView, ViewFactory, ViewState};
use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewEventKind {
    Jumped,
    MoveStarted,
    MoveFinished,
    Shown,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewEvent {
    pub kind: ViewEventKind,
    pub from: String,
    pub to: String,
}

/// Last state a view was told to draw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedView {
    pub state: Option<ViewState>,
    pub is_shown: bool,
}

#[derive(Debug, Default)]
struct ViewLogData {
    views: IndexMap<(String, String), RecordedView>,
    events: Vec<ViewEvent>,
}

/// Shared record of all headless views of one engine.
#[derive(Debug, Clone, Default)]
pub struct ViewLog {
    inner: Arc<Mutex<ViewLogData>>,
}

impl ViewLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut ViewLogData) -> R) -> R {
        let mut data = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    fn record(&self, from: &str, to: &str, kind: ViewEventKind, update: impl FnOnce(&mut RecordedView)) {
        self.with(|data| {
            let view = data
                .views
                .entry((from.to_string(), to.to_string()))
                .or_default();
            update(view);
            data.events.push(ViewEvent {
                kind,
                from: from.to_string(),
                to: to.to_string(),
            });
        });
    }

    pub fn view(&self, from: &str, to: &str) -> Option<RecordedView> {
        self.with(|data| data.views.get(&(from.to_string(), to.to_string())).cloned())
    }

    /// Views currently shown, in creation order.
    pub fn shown(&self) -> Vec<(String, String)> {
        self.with(|data| {
            data.views
                .iter()
                .filter(|(_, view)| view.is_shown)
                .map(|(pair, _)| pair.clone())
                .collect()
        })
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.with(|data| data.events.clone())
    }

    pub fn clear_events(&self) {
        self.with(|data| data.events.clear());
    }
}

/// Creates headless views writing into one [`ViewLog`].
#[derive(Debug, Clone)]
pub struct HeadlessViewFactory {
    log: ViewLog,
    move_duration: Duration,
}

impl HeadlessViewFactory {
    pub fn new(log: ViewLog) -> Self {
        Self {
            log,
            move_duration: Duration::ZERO,
        }
    }

    /// Lets every move take the given time, like an animation would.
    pub fn with_move_duration(mut self, move_duration: Duration) -> Self {
        self.move_duration = move_duration;
        self
    }

    pub fn log(&self) -> &ViewLog {
        &self.log
    }
}

impl ViewFactory for HeadlessViewFactory {
    fn create_view(&self, from: &str, to: &str) -> Box<dyn DependencyView> {
        debug!("Creating view for {}->{}", from, to);
        Box::new(HeadlessView {
            from: from.to_string(),
            to: to.to_string(),
            log: self.log.clone(),
            move_duration: self.move_duration,
        })
    }
}

struct HeadlessView {
    from: String,
    to: String,
    log: ViewLog,
    move_duration: Duration,
}

impl DependencyView for HeadlessView {
    fn jump_to_position_and_show_if_visible(&mut self, state: &ViewState) {
        let state = state.clone();
        self.log
            .record(&self.from, &self.to, ViewEventKind::Jumped, |view| {
                view.is_shown = state.is_visible;
                view.state = Some(state);
            });
    }

    fn move_to_position(&mut self, state: &ViewState) -> BoxFuture<'static, ()> {
        let (from, to) = (self.from.clone(), self.to.clone());
        let log = self.log.clone();
        let move_duration = self.move_duration;
        let state = state.clone();
        async move {
            log.record(&from, &to, ViewEventKind::MoveStarted, |_| {});
            if !move_duration.is_zero() {
                tokio::time::sleep(move_duration).await;
            }
            log.record(&from, &to, ViewEventKind::MoveFinished, |view| {
                view.state = Some(state);
            });
        }
        .boxed()
    }

    fn show_if_visible(&mut self, state: &ViewState) {
        if state.is_visible {
            self.log.record(&self.from, &self.to, ViewEventKind::Shown, |view| {
                view.is_shown = true;
                view.state = Some(state.clone());
            });
        }
    }

    fn hide(&mut self) {
        self.log
            .record(&self.from, &self.to, ViewEventKind::Hidden, |view| view.is_shown = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vector::Vector;

    fn state(is_visible: bool) -> ViewState {
        ViewState {
            from: "a.A".to_string(),
            to: "a.B".to_string(),
            start_point: Vector::new(1.0, 2.0),
            end_point: Vector::new(3.0, 4.0),
            is_visible,
            is_violation: false,
            properties: "dependency methodCall".to_string(),
        }
    }

    #[test]
    fn test_jump_records_state_and_visibility() {
        let log = ViewLog::new();
        let mut view = HeadlessViewFactory::new(log.clone()).create_view("a.A", "a.B");
        view.jump_to_position_and_show_if_visible(&state(true));
        let recorded = log.view("a.A", "a.B").unwrap();
        assert!(recorded.is_shown);
        assert_eq!(recorded.state.unwrap().end_point, Vector::new(3.0, 4.0));

        view.hide();
        assert!(log.shown().is_empty());
        let kinds: Vec<ViewEventKind> = log.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ViewEventKind::Jumped, ViewEventKind::Hidden]);
    }

    #[tokio::test]
    async fn test_move_records_start_and_finish() {
        let log = ViewLog::new();
        let mut view = HeadlessViewFactory::new(log.clone())
            .with_move_duration(Duration::from_millis(5))
            .create_view("a.A", "a.B");
        let moving = view.move_to_position(&state(true));
        assert!(log.events().is_empty());
        moving.await;
        let kinds: Vec<ViewEventKind> = log.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ViewEventKind::MoveStarted, ViewEventKind::MoveFinished]);
        let recorded = log.view("a.A", "a.B").unwrap();
        assert!(!recorded.is_shown);
        assert_eq!(recorded.state.unwrap().start_point, Vector::new(1.0, 2.0));
    }
}
