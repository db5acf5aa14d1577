//! Stored content and link-file associations.

pub mod model;

pub use model::{FileSummary, LinkFile, ManifestFile, NewFile};
