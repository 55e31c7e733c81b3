//! On-disk byte formats.
//!
//! Serialization is kept apart from the logic that decides when to persist,
//! so the format can evolve on its own.
//!
//! # Module Structure
//!
//! - `snapshot`: full-store snapshot file format

pub mod snapshot;

pub use snapshot::{
    decode, encode, read_snapshot, write_snapshot, Snapshot, SNAPSHOT_FORMAT_VERSION,
    SNAPSHOT_HEADER_SIZE, SNAPSHOT_MAGIC,
};
