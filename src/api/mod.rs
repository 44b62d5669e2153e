//! API module: REST endpoints and the static form

pub mod rest;
pub mod dto;

pub use rest::{create_rest_router, AppState, RouterOptions};
