//! # dochub-auth
//!
//! Verification of the access tokens Supabase issues to signed-in users.
//! DocHub never issues tokens of its own in production; [`JwtEncoder`]
//! exists for local development and tests.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
