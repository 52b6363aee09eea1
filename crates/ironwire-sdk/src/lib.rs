//! # ironwire-sdk
//!
//! Public SDK for using ironwire as a Rust library, for instance from a
//! build script.
//!
//! Provides three entry points:
//! - [`ContainerCompiler`](builder::ContainerCompiler): fluent API tying
//!   configuration, metadata, resolution and code emission together.
//! - [`loader`]: YAML/JSON loading of configuration and metadata files, and
//!   artifact writing.
//! - [`Plan`](plan::Plan): a flat, serializable summary of a resolved graph.
//!
//! # Example
//!
//! ```rust,no_run
//! use ironwire_sdk::builder::ContainerCompiler;
//! use ironwire_sdk::loader;
//!
//! # fn main() -> ironwire_common::error::Result<()> {
//! let config = loader::load_config("ironwire.yaml".as_ref())?;
//! let metadata = loader::load_metadata("ironwire.metadata.yaml".as_ref())?;
//! let compiled = ContainerCompiler::new(config).metadata(metadata).compile()?;
//! let _written = loader::write_artifacts(&compiled, "src/generated".as_ref())?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod builder;
pub mod loader;
pub mod plan;
