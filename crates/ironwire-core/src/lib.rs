//! # ironwire-core
//!
//! Builds the definition graph of a dependency-injection container.
//!
//! Handles:
//! - **Definition**: the graph nodes describing how to build one identifier.
//! - **Graph**: the write-once mapping from identifier to definition.
//! - **Hint**: configuration strategies replacing default class resolution.
//! - **Metadata**: the introspection interface the resolver queries.
//! - **Entry points**: the identifiers exposed by the generated container.
//! - **Resolver**: the walk from entry points to a fully resolved graph.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod autoload;
pub mod definition;
pub mod entry_point;
pub mod graph;
pub mod hint;
pub mod metadata;
pub mod resolver;
