//! Temporal combinators built on top of the pipeline's emitter/receiver
//! graph: interpolation-based fusion and joins, latched pairing, frontier
//! reordering, and windowing, plus the dynamic per-key branch dispatcher.

mod error;
mod fuse;
mod interpolation;
mod pair;
mod parallel_sparse;
mod window;
mod zip_merge;

pub use error::{OperatorError, OperatorResult};
pub use fuse::{Fuse, Join};
pub use interpolation::{AdjacentValues, Exact, InterpolationResult, Interpolator, ReproducibleInterpolator};
pub use pair::Pair;
pub use parallel_sparse::{FixedParallelDo, ParallelSparseDo, TerminationPolicy, WhenKeyNotPresent};
pub use window::{DynamicWindow, RelativeIndexWindow, RelativeTimeWindow};
pub use zip_merge::{Merge, Zip};
