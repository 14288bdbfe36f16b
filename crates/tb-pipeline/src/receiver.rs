use crate::delivery::DeliveryPolicy;
use crate::error::PipelineResult;
use crate::queue::{PushOutcome, ReceiverQueue};
use crate::replay::{self, ReplayDescriptor};
use crate::sync_context::SyncContext;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tb_buffer::{DateTime, Message};
use tb_clock::VirtualClock;
use tb_shared::{Clearable, SharedPool};
use tracing::{debug, trace, warn};

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

enum Handler<T> {
    Sync(Arc<dyn Fn(Message<T>) + Send + Sync>),
    Async(Arc<dyn Fn(Message<T>) -> BoxFuture + Send + Sync>),
}

/// The input end of a component: a delivery-policy-governed queue plus a
/// per-message handler, bound to one synchronization context.
pub struct Receiver<T> {
    id: i32,
    context: Arc<SyncContext>,
    queue: Arc<ReceiverQueue<T>>,
    handler: Handler<T>,
    on_unsubscribed: Mutex<Option<Arc<dyn Fn(DateTime) + Send + Sync>>>,
    recycler: Option<Arc<SharedPool<T>>>,
    clock: Arc<Mutex<VirtualClock>>,
    replay: Arc<Mutex<ReplayDescriptor>>,
}

impl<T: Send + Sync + 'static> Receiver<T> {
    pub(crate) fn new_sync(
        id: i32,
        context: Arc<SyncContext>,
        policy: DeliveryPolicy<T>,
        on_message: impl Fn(Message<T>) + Send + Sync + 'static,
        clock: Arc<Mutex<VirtualClock>>,
        replay: Arc<Mutex<ReplayDescriptor>>,
    ) -> Arc<Self> {
        Arc::new(Receiver {
            id,
            context,
            queue: Arc::new(ReceiverQueue::new(id, policy)),
            handler: Handler::Sync(Arc::new(on_message)),
            on_unsubscribed: Mutex::new(None),
            recycler: None,
            clock,
            replay,
        })
    }

    pub(crate) fn new_async(
        id: i32,
        context: Arc<SyncContext>,
        policy: DeliveryPolicy<T>,
        on_message: impl Fn(Message<T>) -> BoxFuture + Send + Sync + 'static,
        clock: Arc<Mutex<VirtualClock>>,
        replay: Arc<Mutex<ReplayDescriptor>>,
    ) -> Arc<Self> {
        Arc::new(Receiver {
            id,
            context,
            queue: Arc::new(ReceiverQueue::new(id, policy)),
            handler: Handler::Async(Arc::new(on_message)),
            on_unsubscribed: Mutex::new(None),
            recycler: None,
            clock,
            replay,
        })
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn on_unsubscribed(&self, hook: impl Fn(DateTime) + Send + Sync + 'static) {
        *self.on_unsubscribed.lock() = Some(Arc::new(hook));
    }

    /// Attaches a recycling pool used by downstream operator code to
    /// deep-clone queued payloads instead of allocating fresh ones. `T`
    /// must be `Clearable` so the pool can reset instances between uses.
    pub fn with_recycler(mut self: Arc<Self>, recycler: Arc<SharedPool<T>>) -> Arc<Self>
    where
        T: Clearable,
    {
        Arc::get_mut(&mut self)
            .expect("with_recycler must be called before sharing the receiver")
            .recycler = Some(recycler);
        self
    }

    #[must_use]
    pub fn recycler(&self) -> Option<&Arc<SharedPool<T>>> {
        self.recycler.as_ref()
    }

    pub(crate) fn enqueue(&self, message: Message<T>) -> PipelineResult<PushOutcome> {
        self.queue.push(message)
    }

    /// Attempts `SynchronousOrThrottle`'s same-thread fast path: if the
    /// policy requests it, the handler is a plain `Sync` closure (an async
    /// handler can't run to completion without awaiting), and this
    /// receiver's sync context isn't already busy with another delivery,
    /// drains the queue inline on the posting thread instead of handing a
    /// drain future to the scheduler. Returns `false` if any of that
    /// doesn't hold, in which case the caller should fall back to
    /// spawning `drain_future` as usual.
    pub(crate) fn try_deliver_synchronously(self: &Arc<Self>) -> bool {
        if !self.queue.attempt_synchronous() {
            return false;
        }
        let Handler::Sync(f) = &self.handler else {
            return false;
        };
        let Some(_guard) = self.context.try_lock_sync() else {
            return false;
        };
        while let Some(message) = self.queue.pop() {
            trace!(receiver_id = self.id, "dispatch sync handler (synchronous fast path)");
            f(message);
        }
        true
    }

    /// Signals that no more messages will arrive at `time`; drains whatever
    /// is still queued synchronously (best-effort, handler errors are not
    /// propagated here) and then invokes the unsubscribe hook.
    pub(crate) fn close(self: &Arc<Self>, time: DateTime) {
        self.queue.close();
        debug!(receiver_id = self.id, "receiver closing");
        if let Some(hook) = self.on_unsubscribed.lock().clone() {
            hook(time);
        }
    }

    /// Builds the drain future the scheduler spawns after a post: pops
    /// everything currently queued and runs the handler for each, serially,
    /// under this receiver's sync context.
    pub(crate) fn drain_future(self: &Arc<Self>) -> BoxFuture {
        let receiver = Arc::clone(self);
        Box::pin(async move {
            let context = Arc::clone(&receiver.context);
            context
                .run(async {
                    while let Some(message) = receiver.queue.pop() {
                        let descriptor = *receiver.replay.lock();
                        let delay = replay::pacing_delay(&descriptor, &receiver.clock.lock(), message.originating_time());
                        if let Some(delay) = delay {
                            trace!(receiver_id = receiver.id, ?delay, "pacing replay delivery");
                            tokio::time::sleep(delay).await;
                        }
                        match &receiver.handler {
                            Handler::Sync(f) => {
                                trace!(receiver_id = receiver.id, "dispatch sync handler");
                                f(message);
                            }
                            Handler::Async(f) => {
                                trace!(receiver_id = receiver.id, "dispatch async handler");
                                f(message).await;
                            }
                        }
                    }
                })
                .await;
        })
    }
}

/// Type-erased view used by `Pipeline::diagnostics()` to report queue
/// depths without the pipeline needing to know every receiver's payload
/// type.
pub(crate) trait ReceiverDiagnostics: Send + Sync {
    fn receiver_id(&self) -> i32;
    fn queue_len(&self) -> usize;
}

impl<T: Send + Sync + 'static> ReceiverDiagnostics for Receiver<T> {
    fn receiver_id(&self) -> i32 {
        self.id
    }
    fn queue_len(&self) -> usize {
        self.queue_len()
    }
}

pub(crate) fn warn_drop(receiver_id: i32, reason: &str) {
    warn!(receiver_id, reason, "message dropped before delivery");
}
