//! Bookstore catalog application
//!
//! The authors and books modules, plus the bootstrap that wires them to a
//! document store and the HTTP server.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::{build_registry, seed, serve};
