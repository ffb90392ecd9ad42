//! Response types for HTTP handlers.

mod errors;
mod files;

pub use errors::*;
pub use files::*;
