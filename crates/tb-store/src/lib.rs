//! Persisted stream format, catalog metadata records, and the transport-
//! agnostic remoting bridge (handshake messages, clock-sync sub-protocol).
//!
//! The wire layout is shared between local persistence and remoting: a
//! remote importer writes received envelopes+bytes into the same
//! `StoreWriter`/`StoreReader` shape that a local recording uses, so the
//! pipeline reads both identically.

mod catalog;
mod error;
mod record;
mod remoting;
mod store;

pub use catalog::{CatalogEntry, CatalogHeader, RuntimeInfo, StreamFlags, StreamMetadata, TypeSchemaEntry};
pub use error::{StoreError, StoreResult};
pub use record::MessageRecord;
pub use remoting::{
    compute_offset_ticks, ClockSyncReply, ClockSyncRequest, MetaHello, MetaMessage, MetaWelcome, PrimaryClockRegistry,
    DEFAULT_CLOCK_PORT, DEFAULT_STORE_PORT, PROTOCOL_VERSION,
};
pub use store::{StoreReader, StoreWriter};
