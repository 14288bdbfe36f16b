//! Thin facade crate over the `tb-*` component crates: re-exports their
//! public APIs through one [`prelude`] module so downstream code (and the
//! integration tests in `tests/integration/`) can depend on a single
//! import.

pub mod prelude {
    pub use tb_buffer::{DateTime, Envelope, Message, RelativeBound, RelativeTimeInterval, TimeInterval, TimeSpan};
    pub use tb_clock::{CalibrationPoint, TickCalibration, TimeSource, VirtualClock};
    pub use tb_operators::{
        AdjacentValues, DynamicWindow, Exact, Fuse, InterpolationResult, Interpolator, Join, Merge, OperatorError,
        Pair, ParallelSparseDo, RelativeIndexWindow, RelativeTimeWindow, ReproducibleInterpolator, TerminationPolicy,
        WhenKeyNotPresent, Zip,
    };
    pub use tb_pipeline::{
        DeliveryPolicy, Emitter, Pipeline, PipelineDiagnostics, PipelineError, QueueDiscipline, Receiver,
        ReplayDescriptor,
    };
    pub use tb_serialize::{HandlerRegistry, SchemaCatalog, SerializeError, Serializer};
    pub use tb_shared::{Clearable, KeyedSharedPool, Shared, SharedError, SharedPool};
    pub use tb_store::{
        compute_offset_ticks, CatalogEntry, ClockSyncReply, ClockSyncRequest, MessageRecord, MetaHello, MetaMessage,
        StoreError, StoreReader, StoreWriter, StreamFlags, PROTOCOL_VERSION,
    };
}
