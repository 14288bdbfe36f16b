//! Fixed little-endian binary codec and core wire data model: `Envelope`,
//! `Message<T>`, `DateTime`, `TimeSpan`, and `TimeInterval`.
//!
//! This is the bit-exact boundary that `tb-serialize` and `tb-store` build
//! on; every on-disk and on-wire message passes through `BufferWriter`/
//! `BufferReader` unchanged.

mod datetime;
mod envelope;
mod error;
mod reader;
mod writer;

pub use datetime::{DateTime, RelativeBound, RelativeTimeInterval, TimeInterval, TimeSpan};
pub use envelope::{Envelope, Message};
pub use error::{BufferError, BufferResult};
pub use reader::BufferReader;
pub use writer::BufferWriter;
