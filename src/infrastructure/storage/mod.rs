//! Storage Backend
//!
//! `SQLite` access to the session manager's record store.

pub mod records;

pub use records::{RecordStore, SqliteRecordStore};
