//! Repository Layer
//!
//! The remote persistence contract, its implementations, the shared
//! mutation pipeline and the in-memory list store the UI observes.

mod memory;
mod pipeline;
mod rest;
mod store;
mod traits;

#[cfg(test)]
mod tests;

pub use memory::MemoryTable;
pub use pipeline::MutationPipeline;
pub use rest::{RemoteConfig, RestTable};
pub use store::ListStore;
pub use traits::{Embed, Filter, OrderBy, RemoteTable, SelectQuery};
