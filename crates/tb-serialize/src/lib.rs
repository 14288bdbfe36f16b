mod backcompat;
mod context;
mod error;
mod handler;
mod schema;

pub use backcompat::BackCompatSerializer;
pub use context::{CloneContext, DeserializationContext, RefAssignment, RefPrefix, SerializationContext};
pub use error::{SerializeError, SerializeResult};
pub use handler::{HandlerRegistry, Serializer};
pub use schema::{schema_id_for, reconcile_members, MemberSchema, SchemaCatalog, TypeFlags, TypeSchema};
