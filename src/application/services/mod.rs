//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, GitBackend, etc.)
//! but are themselves concrete structs, not traits.

mod path_validator;
mod probe;
mod sync;

pub use path_validator::PathValidator;
pub use probe::RepositoryProbe;
pub use sync::SyncService;
