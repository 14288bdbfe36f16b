use std::sync::Arc;
use tb_buffer::TimeSpan;

/// Queue capacity and overflow behavior for a receiver.
#[derive(Clone)]
pub enum QueueDiscipline {
    /// Unbounded queue, never drops.
    Unlimited,
    /// Capacity 1: a new message replaces whatever is queued (not yet
    /// delivered) ahead of it.
    LatestMessage,
    /// Bounded queue; `post` blocks the calling thread until there is room.
    Throttle { capacity: usize },
    /// Attempt same-thread delivery if the receiver's sync context is free;
    /// otherwise behaves like `Throttle`.
    SynchronousOrThrottle { capacity: usize },
}

/// Delivery policy for one receiver, mirroring the four built-in
/// dispositions plus the latency/guarantee/synchronous knobs that apply
/// across all of them.
#[derive(Clone)]
pub struct DeliveryPolicy<T> {
    pub discipline: QueueDiscipline,
    /// Messages whose `creation_time - originating_time` exceeds this are
    /// dropped before entering the queue (reported, not fatal).
    pub maximum_latency: Option<TimeSpan>,
    /// When this returns `true` for a message, no overflow rule may drop it.
    pub guarantee_delivery: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
    /// If true, the runtime may run the handler on the posting thread
    /// rather than enqueueing, provided the receiver isn't already running.
    pub attempt_synchronous: bool,
}

impl<T> DeliveryPolicy<T> {
    #[must_use]
    pub fn unlimited() -> Self {
        DeliveryPolicy {
            discipline: QueueDiscipline::Unlimited,
            maximum_latency: None,
            guarantee_delivery: None,
            attempt_synchronous: false,
        }
    }

    #[must_use]
    pub fn latest_message() -> Self {
        DeliveryPolicy {
            discipline: QueueDiscipline::LatestMessage,
            maximum_latency: None,
            guarantee_delivery: None,
            attempt_synchronous: false,
        }
    }

    #[must_use]
    pub fn throttle(capacity: usize) -> Self {
        DeliveryPolicy {
            discipline: QueueDiscipline::Throttle { capacity },
            maximum_latency: None,
            guarantee_delivery: None,
            attempt_synchronous: false,
        }
    }

    #[must_use]
    pub fn synchronous_or_throttle(capacity: usize) -> Self {
        DeliveryPolicy {
            discipline: QueueDiscipline::SynchronousOrThrottle { capacity },
            maximum_latency: None,
            guarantee_delivery: None,
            attempt_synchronous: true,
        }
    }

    #[must_use]
    pub fn with_maximum_latency(mut self, latency: TimeSpan) -> Self {
        self.maximum_latency = Some(latency);
        self
    }

    #[must_use]
    pub fn with_guarantee_delivery(mut self, f: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        self.guarantee_delivery = Some(f);
        self
    }
}

impl<T> Default for DeliveryPolicy<T> {
    fn default() -> Self {
        DeliveryPolicy::unlimited()
    }
}
