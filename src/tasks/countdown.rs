//! Countdown ticker background task

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::debug;

/// Default period between two ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A running ticker. Dropping the handle does not stop the task; call
/// [`TickerHandle::cancel`].
#[derive(Debug)]
pub struct TickerHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Abort the ticker task
    pub fn cancel(self) {
        self.task.abort();
        debug!("Ticker generation {} cancelled", self.generation);
    }
}

/// Owns at most one periodic ticker at a time.
///
/// Every start gets a new generation number which is handed to the tick
/// callback, so the owner can ignore a tick that raced a stop or restart.
#[derive(Debug)]
pub struct CountdownScheduler {
    period: Duration,
    active: Option<TickerHandle>,
    next_generation: u64,
}

impl CountdownScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            active: None,
            next_generation: 1,
        }
    }

    /// Start ticking, replacing any ticker already running.
    ///
    /// The first tick fires one period after the call. Must be called from
    /// within a tokio runtime. Returns the generation of the new ticker.
    pub fn start<F>(&mut self, on_tick: F) -> u64
    where
        F: Fn(u64) + Send + 'static,
    {
        self.stop();

        let generation = self.next_generation;
        self.next_generation += 1;
        let period = self.period;
        // Deadlines are fixed here, not when the task is first polled; late
        // ticks are delivered in a burst so the count tracks elapsed time
        let mut interval = interval_at(Instant::now() + period, period);

        let task = tokio::spawn(async move {
            loop {
                interval.tick().await;
                on_tick(generation);
            }
        });

        debug!("Ticker generation {} started ({:?} period)", generation, period);
        self.active = Some(TickerHandle { generation, task });
        generation
    }

    /// Stop the active ticker. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Generation of the active ticker, if any
    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(TickerHandle::generation)
    }

    /// Whether a tick carrying `generation` comes from the active ticker
    pub fn is_current(&self, generation: u64) -> bool {
        self.active_generation() == Some(generation)
    }
}

impl Default for CountdownScheduler {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Drop for CountdownScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };
    use tokio::time::advance;

    async fn settle(by: Duration) {
        advance(by).await;
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
    }

    fn counter() -> (Arc<AtomicU32>, impl Fn(u64) + Send + 'static) {
        let count = Arc::new(AtomicU32::new(0));
        let handle = Arc::clone(&count);
        (count, move |_: u64| {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let mut scheduler = CountdownScheduler::default();
        let (count, on_tick) = counter();
        scheduler.start(on_tick);

        settle(Duration::from_millis(999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        for expected in 1..=3 {
            settle(Duration::from_millis(1000)).await;
            assert_eq!(count.load(Ordering::SeqCst), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticking_and_is_idempotent() {
        let mut scheduler = CountdownScheduler::default();
        let (count, on_tick) = counter();
        scheduler.start(on_tick);
        settle(Duration::from_millis(1500)).await;

        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert!(!scheduler.is_active());

        settle(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_ticker() {
        let mut scheduler = CountdownScheduler::default();
        let (first_count, first) = counter();
        let (second_count, second) = counter();

        let g1 = scheduler.start(first);
        let g2 = scheduler.start(second);
        assert_ne!(g1, g2);
        assert!(scheduler.is_current(g2));
        assert!(!scheduler.is_current(g1));

        settle(Duration::from_millis(3500)).await;
        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_receives_its_generation() {
        let mut scheduler = CountdownScheduler::new(Duration::from_millis(100));
        let seen = Arc::new(AtomicU32::new(0));
        let sink = Arc::clone(&seen);
        let generation = scheduler.start(move |g| {
            sink.store(g as u32, Ordering::SeqCst);
        });

        settle(Duration::from_millis(100)).await;
        assert_eq!(u64::from(seen.load(Ordering::SeqCst)), generation);
    }
}
