pub mod libs;

pub use crate::libs::error::{FioError, Result};
pub use crate::libs::io::*;
