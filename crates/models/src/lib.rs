pub mod errors;
pub mod patch;
pub mod record;
pub mod vars;

pub use errors::*;
pub use patch::*;
pub use record::*;
pub use vars::*;

/// Identifier of a persisted config record
pub type ConfigId = uuid::Uuid;
