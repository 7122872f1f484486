pub mod error;
pub mod logging;
pub mod normalization;

pub use error::*;
pub use normalization::{is_canonical, normalize_phone};
