//! Injectable sleep strategy.
//!
//! Every pause of the components goes through [`Delay`], so tests can drive the
//! request flows without waiting while keeping the call order intact.

use std::time::Duration;

use mockall::automock;

/// Trait for suspending the current session.
///
/// Every call is a cancellation point: dropping the enclosing future stops the
/// session there.
#[automock]
pub trait Delay {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[cfg(test)]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}
