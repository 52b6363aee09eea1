//! # ironwire-compiler
//!
//! Serializes a resolved definition graph into the Rust source of a
//! container: one factory per identifier, singleton caches, autoload
//! proxies and file-based definition bodies.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod artifact;
pub mod emitter;
pub mod naming;
pub mod writer;

pub use artifact::{Artifact, CompiledContainer};
pub use emitter::compile;
