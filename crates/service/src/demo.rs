//! Producers behind the streaming demo endpoints.
//!
//! - `bounded_sequence`: finite, ordered, then completes
//! - `greeting`: one deferred value
//! - `Ticker`: unbounded periodic counter, stopped by dropping or cancelling its stream

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::Stream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

pub const BOUNDED_SEQUENCE: [i64; 3] = [1, 2, 3];
pub const GREETING: &str = "Hello World";
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub fn bounded_sequence() -> impl Stream<Item = i64> + Send + 'static {
    tokio_stream::iter(BOUNDED_SEQUENCE)
}

pub async fn greeting() -> String {
    tokio::task::yield_now().await;
    GREETING.to_string()
}

/// Starts periodic counters and tracks how many producers are still running.
#[derive(Clone)]
pub struct Ticker {
    period: Duration,
    active: Arc<AtomicUsize>,
}

impl Ticker {
    /// A zero period is raised to 1 ms.
    pub fn new(period: Duration) -> Self {
        Self { period: period.max(MIN_PERIOD), active: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Producers that have not yet released their timer.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Spawn a producer emitting 0, 1, 2, ... one period apart, starting one
    /// period from now.
    ///
    /// The channel holds a single value, so a slow consumer pauses the
    /// producer instead of letting values pile up. Missed ticks are delayed,
    /// never replayed in a burst.
    pub fn start(&self) -> TickStream {
        let (tx, rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let period = self.period();
        let active = ActiveProducer::enter(&self.active);
        debug!(period_ms = period.as_millis() as u64, "ticker started");

        tokio::spawn(async move {
            let _active = active;
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut next: u64 = 0;
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    sent = tx.send(next) => if sent.is_err() { break },
                }
                next += 1;
            }
            debug!(emitted = next, "ticker cancelled");
        });

        TickStream { rx, token: token.clone(), _guard: token.drop_guard() }
    }
}

struct ActiveProducer(Arc<AtomicUsize>);

impl ActiveProducer {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for ActiveProducer {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Consumer side of a ticker. Never completes on its own; dropping it
/// cancels the producer.
pub struct TickStream {
    rx: mpsc::Receiver<u64>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl TickStream {
    /// Withdraw interest. No value is yielded after this returns.
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.rx.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Stream for TickStream {
    type Item = u64;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<u64>> {
        if self.token.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}
