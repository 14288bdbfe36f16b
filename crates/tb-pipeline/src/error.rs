use tb_buffer::DateTime;

/// Fatal-to-pipeline and fatal-to-component errors raised by the emitter/
/// receiver graph and the scheduler. `OutOfOrderPost` and `Cancelled` map
/// directly onto the error taxonomy; `ReceiverClosed` is this crate's own
/// addition for posting into a receiver that has already unsubscribed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("out-of-order post on source {source_id}: originating_time {attempted:?} <= last {last:?}")]
    OutOfOrderPost {
        source_id: i32,
        last: DateTime,
        attempted: DateTime,
    },
    #[error("pipeline cancelled")]
    Cancelled,
    #[error("receiver {receiver_id} has already unsubscribed")]
    ReceiverClosed { receiver_id: i32 },
    #[error("throttled receiver {receiver_id} queue is closed")]
    ThrottleClosed { receiver_id: i32 },
    #[error("cannot subscribe receiver {receiver_id} to a running emitter without allow_while_running")]
    SubscriptionWhileRunning { receiver_id: i32 },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
