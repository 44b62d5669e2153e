//! Service layer module

pub mod conversion_service;
pub mod types;

pub use conversion_service::{ConversionError, ConversionService, MAX_HISTORY_LIMIT};
pub use types::*;
