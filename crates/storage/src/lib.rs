//! Storage layer for custody
//!
//! This crate implements committed field storage with:
//! - ShardedStore: per-scope sharded storage behind the `Storage` trait
//! - Snapshot file format for durable stores

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod sharded;

pub use format::Snapshot;
pub use sharded::{Shard, ShardedStore};
