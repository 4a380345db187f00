//! Structured diff data parsed from canonical unified-diff text.

/// A single file's diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Current file path (after rename if applicable).
    pub path: String,
    /// Previous file path (if renamed).
    pub old_path: Option<String>,
    /// File status.
    pub status: FileStatus,
    /// Change hunks.
    pub hunks: Vec<Hunk>,
    /// Number of added lines.
    pub additions: usize,
    /// Number of deleted lines.
    pub deletions: usize,
}

impl FileDiff {
    /// Create a new file diff.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            status: FileStatus::Modified,
            hunks: Vec::new(),
            additions: 0,
            deletions: 0,
        }
    }

    /// Display name for the file (handles renames).
    pub fn display_name(&self) -> String {
        match self.old_path {
            Some(ref old) if old != &self.path => format!("{} → {}", old, self.path),
            _ => self.path.clone(),
        }
    }

    /// Language hint derived from the file extension, used by the
    /// client-side highlighter.
    pub fn language(&self) -> &str {
        self.path
            .rsplit_once('.')
            .map(|(stem, ext)| {
                if stem.is_empty() || ext.contains('/') {
                    ""
                } else {
                    ext
                }
            })
            .unwrap_or("")
    }

    /// Recalculate line statistics from hunks.
    pub fn recalculate_stats(&mut self) {
        self.additions = self
            .hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == LineKind::Addition)
            .count();
        self.deletions = self
            .hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == LineKind::Deletion)
            .count();
    }
}

/// File status in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    /// Tag text shown in the file header.
    pub fn tag(&self) -> &'static str {
        match self {
            FileStatus::Added => "ADDED",
            FileStatus::Modified => "CHANGED",
            FileStatus::Deleted => "DELETED",
            FileStatus::Renamed => "RENAMED",
        }
    }

    /// CSS class suffix used by the diff2html stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            FileStatus::Added => "d2h-added",
            FileStatus::Modified => "d2h-changed",
            FileStatus::Deleted => "d2h-deleted",
            FileStatus::Renamed => "d2h-moved",
        }
    }
}

/// A contiguous region of changes (hunk).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Header line (e.g., "@@ -10,5 +10,7 @@ fn example()").
    pub header: String,
    /// Old file starting line.
    pub old_start: u32,
    /// Number of lines in old version.
    pub old_count: u32,
    /// New file starting line.
    pub new_start: u32,
    /// Number of lines in new version.
    pub new_count: u32,
    /// Lines in this hunk.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Create a new hunk with the given header info.
    pub fn new(old_start: u32, old_count: u32, new_start: u32, new_count: u32) -> Self {
        Self {
            header: format!(
                "@@ -{},{} +{},{} @@",
                old_start, old_count, new_start, new_count
            ),
            old_start,
            old_count,
            new_start,
            new_count,
            lines: Vec::new(),
        }
    }
}

/// A single line in the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// Line type.
    pub kind: LineKind,
    /// Line content (without leading +/-/ ).
    pub content: String,
    /// Line number in old file (for Context and Deletion).
    pub old_line: Option<u32>,
    /// Line number in new file (for Context and Addition).
    pub new_line: Option<u32>,
}

impl DiffLine {
    /// Create a new context line.
    pub fn context(content: impl Into<String>, old_line: u32, new_line: u32) -> Self {
        Self {
            kind: LineKind::Context,
            content: content.into(),
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }

    /// Create a new addition line.
    pub fn addition(content: impl Into<String>, new_line: u32) -> Self {
        Self {
            kind: LineKind::Addition,
            content: content.into(),
            old_line: None,
            new_line: Some(new_line),
        }
    }

    /// Create a new deletion line.
    pub fn deletion(content: impl Into<String>, old_line: u32) -> Self {
        Self {
            kind: LineKind::Deletion,
            content: content.into(),
            old_line: Some(old_line),
            new_line: None,
        }
    }

    /// Create a "\ No newline at end of file" style marker.
    pub fn marker(content: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Marker,
            content: content.into(),
            old_line: None,
            new_line: None,
        }
    }
}

/// Line type in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Unchanged line (for context).
    Context,
    /// Added line (+).
    Addition,
    /// Removed line (-).
    Deletion,
    /// Backslash marker line.
    Marker,
}

impl LineKind {
    /// Get the prefix character for this line type.
    pub fn prefix(&self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Addition => '+',
            LineKind::Deletion => '-',
            LineKind::Marker => '\\',
        }
    }

    /// CSS class of the table cell for this line type.
    pub fn css_class(&self) -> &'static str {
        match self {
            LineKind::Context | LineKind::Marker => "d2h-cntx",
            LineKind::Addition => "d2h-ins",
            LineKind::Deletion => "d2h-del",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_diff_display_name() {
        let mut file = FileDiff::new("src/new.rs");
        assert_eq!(file.display_name(), "src/new.rs");

        file.old_path = Some("src/old.rs".to_string());
        assert_eq!(file.display_name(), "src/old.rs → src/new.rs");

        // Same path shouldn't show arrow
        file.old_path = Some("src/new.rs".to_string());
        assert_eq!(file.display_name(), "src/new.rs");
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(FileDiff::new("src/main.rs").language(), "rs");
        assert_eq!(FileDiff::new("x.py").language(), "py");
        assert_eq!(FileDiff::new("Makefile").language(), "");
        assert_eq!(FileDiff::new(".gitignore").language(), "");
        assert_eq!(FileDiff::new("dir.d/file").language(), "");
    }

    #[test]
    fn test_hunk_header_format() {
        let hunk = Hunk::new(10, 5, 10, 7);
        assert_eq!(hunk.header, "@@ -10,5 +10,7 @@");
    }

    #[test]
    fn test_recalculate_stats() {
        let mut file = FileDiff::new("a.txt");
        let mut hunk = Hunk::new(1, 2, 1, 2);
        hunk.lines.push(DiffLine::context("same", 1, 1));
        hunk.lines.push(DiffLine::deletion("old", 2));
        hunk.lines.push(DiffLine::addition("new", 2));
        hunk.lines.push(DiffLine::addition("newer", 3));
        file.hunks.push(hunk);

        file.recalculate_stats();
        assert_eq!(file.additions, 2);
        assert_eq!(file.deletions, 1);
    }

    #[test]
    fn test_line_kind_prefix_and_class() {
        assert_eq!(LineKind::Addition.prefix(), '+');
        assert_eq!(LineKind::Deletion.css_class(), "d2h-del");
        assert_eq!(LineKind::Marker.css_class(), "d2h-cntx");
    }
}
