//! # dochub-database
//!
//! The row store behind DocHub. [`store`] defines the traits the services
//! program against; [`repositories`] implements them on PostgreSQL and
//! [`memory`] implements them in-process. [`Store`] picks one from
//! configuration.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use provider::Store;
pub use store::{ChatStore, DocumentStore, WorkspaceStore};
