pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod label;
pub mod marker;
pub mod reconcile;
pub mod sources;
pub mod tracker;

pub use error::{Result, SyncError};
