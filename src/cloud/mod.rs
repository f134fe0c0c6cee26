mod entry;
mod manifest;
mod selector;

pub use entry::ImageEntry;
pub use manifest::Manifest;
pub use selector::{Selector, VirtualizationType, derive_identity};
