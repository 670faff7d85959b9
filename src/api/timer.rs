use chrono::{DateTime, FixedOffset, Local};
use futures::future::BoxFuture;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

pub type TimerCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// One-shot timer, the returned token cancels the pending callback.
/// A callback that already started runs to completion.
pub trait TimerScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, on_fire: TimerCallback) -> CancellationToken;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimerScheduler;

impl TimerScheduler for TokioTimerScheduler {
    fn schedule(&self, delay: Duration, on_fire: TimerCallback) -> CancellationToken {
        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => on_fire().await,
                () = cancel.cancelled() => {}
            }
        });
        token
    }
}
