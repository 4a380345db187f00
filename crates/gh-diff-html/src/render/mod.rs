//! HTML rendering of a [`DiffDocument`].
//!
//! The markup follows the diff2html class layout (`d2h-*`) so the stock
//! diff2html stylesheet and its client-side highlighter apply unchanged.

mod document;
mod expiry;
mod gate;
mod markup;

use crate::model::DiffDocument;
use crate::parser::parse_unified_diff;
use std::fmt;
use std::str::FromStr;

pub use expiry::with_expiry_banner;
pub use gate::{render_gated, simple_hash, AccessGate};
pub use markup::render_fragment;

/// How the two sides of a change are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    LineByLine,
    #[default]
    SideBySide,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::LineByLine => "line-by-line",
            Layout::SideBySide => "side-by-side",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line-by-line" => Ok(Layout::LineByLine),
            "side-by-side" => Ok(Layout::SideBySide),
            other => Err(format!(
                "unknown layout '{}', expected 'line-by-line' or 'side-by-side'",
                other
            )),
        }
    }
}

/// Presentation options for [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub layout: Layout,
    /// Draw the "Files changed" summary above the diff.
    pub show_file_list: bool,
    /// Load the client-side syntax highlighter.
    pub highlight: bool,
    /// Use the strict, non-overflowing CSS needed for rasterization.
    pub for_image_output: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layout: Layout::SideBySide,
            show_file_list: true,
            highlight: true,
            for_image_output: false,
        }
    }
}

/// Settings of the markup generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupConfig {
    pub layout: Layout,
    pub show_file_list: bool,
    /// Change blocks with more lines than this on either side are not paired.
    pub max_line_size_in_block_for_comparison: usize,
    /// Paired lines longer than this are not highlighted inline.
    pub max_line_length_highlight: usize,
}

impl From<&RenderOptions> for MarkupConfig {
    fn from(opts: &RenderOptions) -> Self {
        Self {
            layout: opts.layout,
            show_file_list: opts.show_file_list,
            max_line_size_in_block_for_comparison: 200,
            max_line_length_highlight: 10_000,
        }
    }
}

/// Render a complete, self-contained HTML document.
///
/// Output is a pure function of the arguments.
pub fn render(doc: &DiffDocument, opts: &RenderOptions) -> String {
    let files = parse_unified_diff(doc.canonical_text());
    let fragment = render_fragment(&files, &MarkupConfig::from(opts));
    document::wrap(&document::Page {
        title: document::TITLE,
        styles: document::styles(opts),
        body: &fragment,
        scripts: if opts.highlight {
            document::HIGHLIGHT_SCRIPT
        } else {
            ""
        },
    })
}

/// Escape text for inclusion in HTML content or attribute values.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
