//! Uploaded content held between the upload and a later download.
//!
//! Records live in a concurrent map keyed by random ids and expire after a
//! fixed time-to-live; a background sweeper evicts them on an interval.

pub mod error;
pub mod store;
pub mod sweeper;

pub use error::{Result, StoreError};
pub use store::{ContentStore, FileRecord};
pub use sweeper::SweeperHandle;
