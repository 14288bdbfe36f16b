use crate::delivery::DeliveryPolicy;
use crate::emitter::{Emitter, EmitterDiagnostics};
use crate::ids::IdAllocator;
use crate::receiver::{BoxFuture, Receiver, ReceiverDiagnostics};
use crate::replay::ReplayDescriptor;
use crate::scheduler::Scheduler;
use crate::sync_context::SyncContext;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tb_buffer::{DateTime, Message};
use tb_clock::VirtualClock;
use tracing::info;

/// A read-only snapshot of graph shape used for in-process monitoring,
/// in place of the HTTP admin/metrics surfaces this core has no transport
/// for.
#[derive(Debug, Clone)]
pub struct PipelineDiagnostics {
    pub name: String,
    pub emitter_count: usize,
    pub receiver_queue_depths: Vec<(i32, usize)>,
    pub subpipeline_count: usize,
}

/// A container of components, emitters, receivers, and a shared scheduler.
/// Emitter/receiver creation requires a pipeline reference; both are
/// assigned pipeline-unique numeric ids.
pub struct Pipeline {
    name: String,
    clock: Arc<Mutex<VirtualClock>>,
    scheduler: Arc<Scheduler>,
    id_alloc: IdAllocator,
    started: Arc<AtomicBool>,
    stopped: AtomicBool,
    replay: Arc<Mutex<ReplayDescriptor>>,
    emitters: Mutex<Vec<Weak<dyn EmitterDiagnostics>>>,
    receivers: Mutex<Vec<Weak<dyn ReceiverDiagnostics>>>,
    subpipelines: Mutex<Vec<Arc<Pipeline>>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(name: impl Into<String>, clock: VirtualClock) -> Arc<Self> {
        Arc::new(Pipeline {
            name: name.into(),
            clock: Arc::new(Mutex::new(clock)),
            scheduler: Scheduler::new(),
            id_alloc: IdAllocator::default(),
            started: Arc::new(AtomicBool::new(false)),
            stopped: AtomicBool::new(false),
            replay: Arc::new(Mutex::new(ReplayDescriptor::default())),
            emitters: Mutex::new(Vec::new()),
            receivers: Mutex::new(Vec::new()),
            subpipelines: Mutex::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn virtual_time(&self, real_now: DateTime) -> DateTime {
        self.clock.lock().to_virtual(real_now)
    }

    /// A fresh synchronization context for a new component; every receiver
    /// that component owns should be created on it.
    #[must_use]
    pub fn new_context(&self) -> Arc<SyncContext> {
        self.scheduler.new_context(self.id_alloc.next())
    }

    #[must_use]
    pub fn create_emitter<T: Clone + Send + Sync + 'static>(&self) -> Arc<Emitter<T>> {
        let id = self.id_alloc.next();
        let emitter = Arc::new(Emitter::new(id, Arc::clone(&self.scheduler), Arc::clone(&self.started)));
        self.emitters.lock().push(Arc::downgrade(&emitter) as Weak<dyn EmitterDiagnostics>);
        emitter
    }

    pub fn create_receiver<T: Send + Sync + 'static>(
        &self,
        context: &Arc<SyncContext>,
        policy: DeliveryPolicy<T>,
        on_message: impl Fn(Message<T>) + Send + Sync + 'static,
    ) -> Arc<Receiver<T>> {
        let id = self.id_alloc.next();
        let receiver = Receiver::new_sync(
            id,
            Arc::clone(context),
            policy,
            on_message,
            Arc::clone(&self.clock),
            Arc::clone(&self.replay),
        );
        self.receivers.lock().push(Arc::downgrade(&receiver) as Weak<dyn ReceiverDiagnostics>);
        receiver
    }

    pub fn create_receiver_async<T: Send + Sync + 'static>(
        &self,
        context: &Arc<SyncContext>,
        policy: DeliveryPolicy<T>,
        on_message: impl Fn(Message<T>) -> BoxFuture + Send + Sync + 'static,
    ) -> Arc<Receiver<T>> {
        let id = self.id_alloc.next();
        let receiver = Receiver::new_async(
            id,
            Arc::clone(context),
            policy,
            on_message,
            Arc::clone(&self.clock),
            Arc::clone(&self.replay),
        );
        self.receivers.lock().push(Arc::downgrade(&receiver) as Weak<dyn ReceiverDiagnostics>);
        receiver
    }

    /// A pipeline nested in this one: its own scheduler view, the same
    /// clock. May be started, stopped, and disposed independently, but is
    /// also cascaded into by this pipeline's `stop`.
    #[must_use]
    pub fn create_subpipeline(&self, name: impl Into<String>) -> Arc<Pipeline> {
        let sub = Arc::new(Pipeline {
            name: name.into(),
            clock: Arc::clone(&self.clock),
            scheduler: Scheduler::new(),
            id_alloc: IdAllocator::default(),
            started: Arc::new(AtomicBool::new(false)),
            stopped: AtomicBool::new(false),
            replay: Arc::clone(&self.replay),
            emitters: Mutex::new(Vec::new()),
            receivers: Mutex::new(Vec::new()),
            subpipelines: Mutex::new(Vec::new()),
        });
        self.subpipelines.lock().push(Arc::clone(&sub));
        sub
    }

    pub fn start(&self, replay: ReplayDescriptor) {
        *self.replay.lock() = replay;
        self.started.store(true, Ordering::Release);
        info!(pipeline = self.name, "pipeline started");
    }

    /// Cooperative stop: closes every registered emitter at
    /// `final_originating_time`, which propagates `unsubscribed` to every
    /// receiver in time order as each emitter's `close` runs; then waits
    /// for all in-flight drains (this pipeline's and every subpipeline's)
    /// to finish before returning.
    pub async fn stop(&self, final_originating_time: DateTime, notify_completed: bool) {
        info!(pipeline = self.name, notify_completed, "pipeline stopping");
        for emitter in self.emitters.lock().iter().filter_map(Weak::upgrade) {
            emitter.close_at(final_originating_time);
        }
        self.scheduler.drain_all().await;
        let subpipelines: Vec<Arc<Pipeline>> = self.subpipelines.lock().clone();
        for sub in subpipelines {
            Box::pin(sub.stop(final_originating_time, notify_completed)).await;
        }
        self.stopped.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn diagnostics(&self) -> PipelineDiagnostics {
        let emitters = self.emitters.lock();
        let receivers = self.receivers.lock();
        PipelineDiagnostics {
            name: self.name.clone(),
            emitter_count: emitters.iter().filter_map(Weak::upgrade).count(),
            receiver_queue_depths: receivers
                .iter()
                .filter_map(Weak::upgrade)
                .map(|r| (r.receiver_id(), r.queue_len()))
                .collect(),
            subpipeline_count: self.subpipelines.lock().len(),
        }
    }
}
