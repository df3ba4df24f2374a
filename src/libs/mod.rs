pub mod error;
pub mod fai;
pub mod fmt;
pub mod gene;
pub mod io;
pub mod nt;
pub mod psl;
pub mod seq;
pub mod stat;

pub use error::{FioError, Result};
