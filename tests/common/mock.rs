//! Mock implementations for integration tests.
#![allow(dead_code)]

use depgraph_view::domain::ports::{DependencyView, ViewFactory, ViewState};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};

/// Counts the views created per endpoint pair.
#[derive(Clone, Default)]
pub struct CountingViewFactory {
    pub created: Arc<Mutex<Vec<(String, String)>>>,
}

impl CountingViewFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_for(&self, from: &str, to: &str) -> usize {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|(f, t)| f == from && t == to)
            .count()
    }
}

impl ViewFactory for CountingViewFactory {
    fn create_view(&self, from: &str, to: &str) -> Box<dyn DependencyView> {
        self.created
            .lock()
            .unwrap()
            .push((from.to_string(), to.to_string()));
        Box::new(NoopView)
    }
}

struct NoopView;

impl DependencyView for NoopView {
    fn jump_to_position_and_show_if_visible(&mut self, _state: &ViewState) {}

    fn move_to_position(&mut self, _state: &ViewState) -> BoxFuture<'static, ()> {
        async {}.boxed()
    }

    fn show_if_visible(&mut self, _state: &ViewState) {}

    fn hide(&mut self) {}
}
