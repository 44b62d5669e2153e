//! Image transform engine
//!
//! Wraps the `image` crate:
//! - Decoding with EXIF orientation correction
//! - Fit / fill resizing
//! - Grayscale and approximate CMYK color modes
//! - JPEG, PNG and WebP encoding into data URLs

pub mod preprocess;
pub mod color;
pub mod encode;
pub mod transform;

pub use encode::to_data_url;
pub use transform::{transform, TransformedImage};
