//! Result-store abstractions and the in-memory reference backend.

mod memory;
mod traits;

pub use memory::InMemoryResultStore;
pub use traits::{InsertOutcome, ResultStore, StoreError, StoredResult};
