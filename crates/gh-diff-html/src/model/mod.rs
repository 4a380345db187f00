//! Data models for diff representation.

mod diff;
mod document;

pub use diff::{DiffLine, FileDiff, FileStatus, Hunk, LineKind};
pub use document::DiffDocument;
