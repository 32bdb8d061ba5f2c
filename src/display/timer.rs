use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use log::debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Identifies one scheduled timeout
pub type TimerToken = u64;

/// A scheduled delayed callback that can be cancelled
pub trait TimerHandle: Send {
    fn token(&self) -> TimerToken;

    /// Cancel the timer. Cancelling a fired or already cancelled timer does nothing.
    fn cancel(&mut self);
}

/// Capability to schedule a token to be delivered after a delay
pub trait TimerScheduler: Send {
    fn schedule(&self, delay: Duration, token: TimerToken) -> Box<dyn TimerHandle>;
}

/// Timers backed by tokio tasks.
///
/// Fired tokens arrive on the receiver returned by `channel`, which the event loop
/// hands back to `DisplayStateMachine::on_timer_fired`.
#[derive(Debug, Clone)]
pub struct TokioTimerScheduler {
    sender: UnboundedSender<TimerToken>,
}

impl TokioTimerScheduler {
    pub fn channel() -> (Self, UnboundedReceiver<TimerToken>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

struct TokioTimerHandle {
    token: TimerToken,
    task: Option<JoinHandle<()>>,
}

impl TimerHandle for TokioTimerHandle {
    fn token(&self) -> TimerToken {
        self.token
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Cancelling timer {}", self.token);
            task.abort();
        }
    }
}

impl TimerScheduler for TokioTimerScheduler {
    fn schedule(&self, delay: Duration, token: TimerToken) -> Box<dyn TimerHandle> {
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone during shutdown
            let _ = sender.send(token);
        });
        Box::new(TokioTimerHandle {
            token,
            task: Some(task),
        })
    }
}

/// A timer registered with a `ManualScheduler`
#[derive(Debug, Clone)]
pub struct ScheduledTimer {
    pub token: TimerToken,
    pub delay: Duration,
    cancelled: Arc<AtomicBool>,
}

impl ScheduledTimer {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Scheduler that never fires on its own. Used to drive timeouts by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    timers: Arc<Mutex<Vec<ScheduledTimer>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every timer scheduled so far, cancelled or not
    pub fn scheduled(&self) -> Vec<ScheduledTimer> {
        self.timers.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Tokens of the timers that are still live
    pub fn pending(&self) -> Vec<TimerToken> {
        self.scheduled()
            .into_iter()
            .filter(|t| !t.is_cancelled())
            .map(|t| t.token)
            .collect()
    }
}

struct ManualTimerHandle {
    token: TimerToken,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle for ManualTimerHandle {
    fn token(&self) -> TimerToken {
        self.token
    }

    fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl TimerScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, token: TimerToken) -> Box<dyn TimerHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        if let Ok(mut timers) = self.timers.lock() {
            timers.push(ScheduledTimer {
                token,
                delay,
                cancelled: cancelled.clone(),
            });
        }
        Box::new(ManualTimerHandle { token, cancelled })
    }
}
