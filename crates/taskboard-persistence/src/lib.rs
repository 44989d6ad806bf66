pub mod atomic;
pub mod envelope;
pub mod gateway;
pub mod traits;

pub use envelope::SCHEMA_VERSION;
pub use gateway::JsonFileGateway;
pub use traits::{Collection, RecordStore};
