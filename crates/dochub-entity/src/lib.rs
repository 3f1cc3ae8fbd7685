//! # dochub-entity
//!
//! Row models for DocHub. Every struct in this crate represents a database
//! table row or a domain value object. Database entities derive
//! `sqlx::FromRow`.

pub mod chat;
pub mod document;
pub mod workspace;
