pub mod json;

pub use json::{JsonConfig, JsonReport, convert_to_json};
