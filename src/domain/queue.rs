//! Serialization of asynchronous view updates.

use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared};
use std::future::Future;

/// Completion handle of a queued update. Cloneable, every clone resolves together.
pub type UpdateHandle = Shared<BoxFuture<'static, ()>>;

/// Chains updates so that each one starts only after the previous one has completed.
pub struct UpdateQueue {
    tail: UpdateHandle,
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self {
            tail: future::ready(()).boxed().shared(),
        }
    }

    /// Enqueues `next` behind all previously enqueued updates.
    pub fn do_next<F>(&mut self, next: F) -> UpdateHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let previous = self.tail.clone();
        let chained = async move {
            previous.await;
            next.await;
        }
        .boxed()
        .shared();
        self.tail = chained.clone();
        chained
    }

    /// Resolves once everything enqueued so far has completed.
    pub fn tail(&self) -> UpdateHandle {
        self.tail.clone()
    }
}
