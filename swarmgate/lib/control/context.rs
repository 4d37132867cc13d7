use std::{future::Future, time::Duration};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{SwarmgateError, SwarmgateResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Bounds the control-plane calls made on behalf of a single request.
///
/// A call wrapped with [`CallContext::run`] resolves to its own result, to
/// [`SwarmgateError::Cancelled`] once the token is cancelled, or to
/// [`SwarmgateError::DeadlineExceeded`] once the deadline passes, whichever comes first.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CallContext {
    /// Creates a context without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Ties the context to a parent token: cancelling the parent cancels this context.
    pub fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.token = parent.child_token();
        self
    }

    /// Cancels every call running under this context.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Runs a control-plane call under this context.
    pub async fn run<T, F>(&self, call: F) -> SwarmgateResult<T>
    where
        F: Future<Output = SwarmgateResult<T>>,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(SwarmgateError::Cancelled),
            _ = deadline => Err(SwarmgateError::DeadlineExceeded),
            result = call => result,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_context_passes_result_through() {
        let ctx = CallContext::new();
        let result = ctx.run(async { crate::Ok(7) }).await;
        assert!(matches!(result, Ok(7)));
    }

    #[test_log::test(tokio::test)]
    async fn test_context_cancellation_is_distinct() {
        let ctx = CallContext::new();
        ctx.cancel();

        let result = ctx.run(async { crate::Ok(()) }).await;
        assert!(matches!(result, Err(SwarmgateError::Cancelled)));
    }

    #[test_log::test(tokio::test)]
    async fn test_context_parent_cancellation_propagates() {
        let parent = CancellationToken::new();
        let ctx = CallContext::new().with_parent(&parent);
        parent.cancel();

        let result = ctx.run(std::future::pending::<SwarmgateResult<()>>()).await;
        assert!(matches!(result, Err(SwarmgateError::Cancelled)));
    }

    #[test_log::test(tokio::test)]
    async fn test_context_deadline_exceeded() {
        let ctx = CallContext::with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                crate::Ok(())
            })
            .await;

        assert!(matches!(result, Err(SwarmgateError::DeadlineExceeded)));
    }
}
