pub mod copier;
pub mod driver;

pub use copier::Copier;
pub use driver::{ExportDriver, ExportSummary};
