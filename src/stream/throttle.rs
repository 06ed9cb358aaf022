//! Latest-wins stream throttling

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use pin_project_lite::pin_project;
use tokio::time::{Instant, Sleep, sleep};

/// Extension trait to add latest-wins throttling to any Stream.
pub trait ThrottleExt: Stream {
    /// Emit at most one item per `period`.
    ///
    /// Items arriving while the throttle is paused are coalesced: only the
    /// most recent one is kept. The first item passes through immediately,
    /// and whatever is pending when the source ends is flushed.
    fn throttle(self, period: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, period)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// A stream combinator that limits emission rate, keeping the latest item.
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: S,
        #[pin]
        pause: Sleep,
        period: Duration,
        latest: Option<S::Item>,
        gate_open: bool,
        source_done: bool,
    }
}

impl<S: Stream> Throttle<S> {
    /// Create a new throttled stream.
    pub fn new(stream: S, period: Duration) -> Self {
        Self {
            stream,
            pause: sleep(Duration::ZERO),
            period,
            latest: None,
            gate_open: true,
            source_done: false,
        }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Buffer everything the source has ready, keeping only the latest.
        while !*this.source_done {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.latest = Some(item),
                Poll::Ready(None) => *this.source_done = true,
                Poll::Pending => break,
            }
        }

        if !*this.gate_open && this.pause.as_mut().poll(cx).is_ready() {
            *this.gate_open = true;
        }

        if *this.source_done {
            // Flush the pending item, then end.
            return Poll::Ready(this.latest.take());
        }

        if *this.gate_open {
            if let Some(item) = this.latest.take() {
                *this.gate_open = false;
                this.pause.as_mut().reset(Instant::now() + *this.period);
                return Poll::Ready(Some(item));
            }
        }

        Poll::Pending
    }
}
