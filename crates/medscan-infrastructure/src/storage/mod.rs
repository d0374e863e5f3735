//! Storage layer for atomic file operations and the local key-value store.

mod atomic_file;
mod file_store;

pub use atomic_file::{AtomicFile, AtomicFileError};
pub use file_store::FileKeyValueStore;
