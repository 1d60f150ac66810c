pub mod archive;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod store;

pub use error::{ExportError, Result};
