use crate::error::{PipelineError, PipelineResult};
use crate::receiver::{warn_drop, Receiver};
use crate::scheduler::Scheduler;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use tb_buffer::{DateTime, Envelope, Message};
use tracing::{info, warn};

/// The output end of a component: forms envelopes, enforces the strictly-
/// increasing originating-time invariant, and fans posted messages out to
/// every subscribed receiver.
pub struct Emitter<T> {
    source_id: i32,
    scheduler: Arc<Scheduler>,
    subscribers: Mutex<Vec<Arc<Receiver<T>>>>,
    last_envelope: Mutex<Option<Envelope>>,
    next_sequence: AtomicI32,
    started: Arc<AtomicBool>,
}

impl<T: Clone + Send + Sync + 'static> Emitter<T> {
    pub(crate) fn new(source_id: i32, scheduler: Arc<Scheduler>, started: Arc<AtomicBool>) -> Self {
        Emitter {
            source_id,
            scheduler,
            subscribers: Mutex::new(Vec::new()),
            last_envelope: Mutex::new(None),
            next_sequence: AtomicI32::new(0),
            started,
        }
    }

    #[must_use]
    pub fn source_id(&self) -> i32 {
        self.source_id
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Subscribes `receiver`. `allow_while_running = false` rejects new
    /// subscriptions once the pipeline has started, matching the default
    /// `pipe_to` behavior in the source design; pass `true` to wire up a
    /// running pipeline (subpipeline connectors rely on this).
    pub fn pipe_to(&self, receiver: Arc<Receiver<T>>, allow_while_running: bool) -> PipelineResult<()> {
        if self.started.load(Ordering::Acquire) && !allow_while_running {
            return Err(PipelineError::SubscriptionWhileRunning {
                receiver_id: receiver.id(),
            });
        }
        self.subscribers.lock().push(receiver);
        Ok(())
    }

    /// Forms an envelope and fans `payload` out to every subscriber's
    /// queue. `originating_time` must be strictly greater than the last
    /// accepted post's; violating that is fatal to the pipeline.
    pub fn post(
        &self,
        payload: T,
        originating_time: DateTime,
        creation_time: DateTime,
    ) -> PipelineResult<()> {
        let mut last = self.last_envelope.lock();
        if let Some(prev) = *last {
            if originating_time <= prev.originating_time {
                return Err(PipelineError::OutOfOrderPost {
                    source_id: self.source_id,
                    last: prev.originating_time,
                    attempted: originating_time,
                });
            }
        }
        let sequence_id = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = Envelope::new(self.source_id, sequence_id, originating_time, creation_time);
        *last = Some(envelope);

        // Fan-out happens while `last` is still held, so a second concurrent
        // `post` blocks on the sequence-check until this one's subscribers
        // have all been notified — otherwise two posts could pass their
        // checks in order but interleave delivery out of that order.
        let subscribers = self.subscribers.lock().clone();
        for receiver in &subscribers {
            let message = Message::new(payload.clone(), envelope);
            match receiver.enqueue(message) {
                Ok(crate::queue::PushOutcome::Delivered) => {
                    if !receiver.try_deliver_synchronously() {
                        self.scheduler.spawn(receiver.drain_future());
                    }
                }
                Ok(crate::queue::PushOutcome::DroppedLatency) => {
                    warn_drop(receiver.id(), "maximum_latency exceeded");
                }
                Ok(crate::queue::PushOutcome::DroppedOverflow) => {
                    warn_drop(receiver.id(), "queue overflow");
                }
                Err(err) => {
                    warn!(receiver_id = receiver.id(), %err, "post failed, skipping receiver");
                }
            }
        }
        drop(last);
        Ok(())
    }

    /// Emits an unsubscribed notification to every receiver at `time`.
    pub fn close(&self, time: DateTime) {
        info!(source_id = self.source_id, "emitter closing");
        for receiver in self.subscribers.lock().iter() {
            receiver.close(time);
        }
    }
}

/// Type-erased view `Pipeline` uses to close every registered emitter at
/// stop time without depending on each one's payload type.
pub(crate) trait EmitterDiagnostics: Send + Sync {
    fn source_id(&self) -> i32;
    fn subscriber_count(&self) -> usize;
    fn close_at(&self, time: DateTime);
}

impl<T: Clone + Send + Sync + 'static> EmitterDiagnostics for Emitter<T> {
    fn source_id(&self) -> i32 {
        self.source_id()
    }
    fn subscriber_count(&self) -> usize {
        self.subscriber_count()
    }
    fn close_at(&self, time: DateTime) {
        self.close(time);
    }
}
