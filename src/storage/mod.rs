//! Storage module for conversion history

pub mod traits;
pub mod sqlite;
pub mod null;

pub use traits::{ImageStore, ImageRecord, NewImageRecord};
pub use sqlite::SqliteStorage;
pub use null::NullStorage;
