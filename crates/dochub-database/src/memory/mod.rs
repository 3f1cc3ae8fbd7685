//! In-process row store for local development and tests.

pub mod store;

pub use store::MemoryStore;
