//! Image Conversion Service Library

pub mod config;
pub mod engine;
pub mod advisor;
pub mod service;
pub mod storage;
pub mod api;

pub use config::Config;
