//! Scoped logging sink for deployers and upload managers.
//!
//! Providers never touch the process-wide subscriber. Each one owns a
//! [`Logger`] and runs its work inside it, so an embedding application decides
//! where (and whether) provider events go.

use std::future::Future;
use tracing::Dispatch;
use tracing::instrument::{WithDispatch, WithSubscriber};

#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// A sink that drops every event.
    pub fn discard() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Whatever subscriber is the default on the calling thread.
    pub fn current() -> Self {
        tracing::dispatcher::get_default(|dispatch| Self {
            dispatch: dispatch.clone(),
        })
    }

    /// Run `fut` with this logger as the default subscriber.
    pub fn scope<F: Future>(&self, fut: F) -> WithDispatch<F> {
        fut.with_subscriber(self.dispatch.clone())
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::discard()
    }
}

impl From<Dispatch> for Logger {
    fn from(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }
}
