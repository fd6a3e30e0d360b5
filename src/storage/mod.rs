//! Repository implementations used by the engine facade.

pub mod memory;

pub use memory::{InMemoryRepository, RepositorySnapshot};
