//! Rendering module for outline results.

mod json;

pub use json::{to_json, write_json, JsonFormat};
