//! Snapshot-backed record store for booth.
//!
//! The whole data set lives in memory as a [`booth_core::record::Snapshot`].
//! With [`Persistence::File`] every mutation rewrites the full snapshot to a
//! JSON file through a temp-file-and-rename, one writer at a time.

mod file;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{Persistence, SnapshotStore};
