//! The emitter/receiver graph, scheduler, delivery policies, and replay
//! descriptor binding together the components built on top of this one.

mod delivery;
mod emitter;
mod error;
mod ids;
mod pipeline;
mod queue;
mod receiver;
mod replay;
mod scheduler;
mod sync_context;

pub use delivery::{DeliveryPolicy, QueueDiscipline};
pub use emitter::Emitter;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{Pipeline, PipelineDiagnostics};
pub use receiver::{BoxFuture, Receiver};
pub use replay::ReplayDescriptor;
pub use scheduler::Scheduler;
pub use sync_context::SyncContext;
