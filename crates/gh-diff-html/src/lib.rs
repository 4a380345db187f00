//! # gh-diff-html
//!
//! Turns diff-like text into a styled, self-contained HTML document.
//!
//! ## Design Principles
//!
//! This crate is **pure**: it never touches the network or the filesystem.
//! Everything that leaves the process (gists, files, images) is owned by the
//! delivery layer in `gh-diff-share`. This keeps rendering:
//!
//! - Deterministic: identical inputs produce byte-identical HTML
//! - Testable without any I/O
//! - Forgiving: malformed input degrades instead of failing
//!
//! ## Pipeline
//!
//! ```text
//! raw text ──► normalize() ──► DiffDocument ──► render() ──► HTML
//!                 │                               │
//!         dry-run JSON unwrap          parse_unified_diff() + markup
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use gh_diff_html::{normalize, render, RenderOptions};
//!
//! let doc = normalize("line1\nline2", Some("a.txt"), Some("b.txt"));
//! let html = render(&doc, &RenderOptions::default());
//! assert!(html.starts_with("<!DOCTYPE html>"));
//! ```

pub mod model;
pub mod normalize;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use model::{DiffDocument, DiffLine, FileDiff, FileStatus, Hunk, LineKind};
pub use normalize::{normalize, unwrap_dry_run, PLACEHOLDER_PATH};
pub use parser::{parse_unified_diff, ParseError};
pub use render::{
    render, render_gated, simple_hash, with_expiry_banner, AccessGate, Layout, MarkupConfig,
    RenderOptions,
};
