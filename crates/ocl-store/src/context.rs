//! Cancellable execution context threaded through every store call.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{StoreError, StoreResult};

/// Cancellation handle passed to every [`LayoutStore`](crate::LayoutStore)
/// call and to the graph walker.
///
/// Cloning a `Context` shares the same cancellation state. Use
/// [`child`](Self::child) to derive a context that can be cancelled on its
/// own without affecting the parent.
#[derive(Clone, Debug)]
pub struct Context {
    token: CancellationToken,
}

impl Context {
    /// A fresh, uncancelled context.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Wrap an existing token, e.g. one tied to a signal handler.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// A context cancelled together with this one, but cancellable alone.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fail with [`StoreError::Cancelled`] if the context is cancelled.
    pub fn check(&self) -> StoreResult<()> {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context is cancelled first.
    ///
    /// Only for reads. Work the future already handed to a blocking thread
    /// keeps running after cancellation, so writes must use
    /// [`check`](Self::check) up front and then complete.
    pub async fn run<F, T>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(StoreError::Cancelled),
            result = fut => result,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
