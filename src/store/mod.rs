pub mod catalog;
pub mod layout;
pub mod manifest;
pub mod reference;

pub use layout::StoreLayout;
pub use manifest::ResolvedModel;
pub use reference::ModelReference;
