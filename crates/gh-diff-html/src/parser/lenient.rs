//! Line-prefix parser for diffs the strict parser rejects.
//!
//! Only looks at line prefixes. Hunk ranges are trusted for line numbering
//! but never validated, and body lines that precede any `@@` marker are
//! gathered into one synthetic hunk starting at line 1.

use super::unified::{clean_path, determine_status};
use crate::model::{DiffLine, FileDiff, Hunk};
use crate::normalize::PLACEHOLDER_PATH;
use regex::Regex;
use std::sync::OnceLock;

fn hunk_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@ ?(.*)$")
            .expect("hunk header regex is valid")
    })
}

/// Parser state for the file currently being assembled.
struct Builder {
    files: Vec<FileDiff>,
    file: Option<FileDiff>,
    hunk: Option<Hunk>,
    synthetic: bool,
    old_no: u32,
    new_no: u32,
}

impl Builder {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            file: None,
            hunk: None,
            synthetic: false,
            old_no: 1,
            new_no: 1,
        }
    }

    fn start_file(&mut self, source: &str, target: &str) {
        self.finish_file();

        let source = clean_path(source);
        let target = clean_path(target);
        let display = if target == "/dev/null" || target.is_empty() {
            source.clone()
        } else {
            target.clone()
        };

        let mut file = FileDiff::new(display);
        file.status = determine_status(&source, &target);
        if source != target && !source.is_empty() && source != "/dev/null" {
            file.old_path = Some(source);
        }
        self.file = Some(file);
    }

    fn start_hunk(&mut self, line: &str) {
        self.finish_hunk();

        let hunk = match hunk_header_re().captures(line) {
            Some(caps) => {
                let num = |i: usize, default: u32| {
                    caps.get(i)
                        .and_then(|m| m.as_str().parse().ok())
                        .unwrap_or(default)
                };
                let mut hunk = Hunk::new(num(1, 1), num(2, 1), num(3, 1), num(4, 1));
                hunk.header = line.to_string();
                hunk
            }
            None => {
                let mut hunk = Hunk::new(self.old_no, 0, self.new_no, 0);
                hunk.header = line.to_string();
                hunk
            }
        };

        self.old_no = hunk.old_start.max(1);
        self.new_no = hunk.new_start.max(1);
        self.synthetic = false;
        self.hunk = Some(hunk);
    }

    fn push_body(&mut self, line: &str) {
        if self.hunk.is_none() {
            self.hunk = Some(Hunk::new(self.old_no, 0, self.new_no, 0));
            self.synthetic = true;
        }

        let parsed = match line.chars().next() {
            Some('+') => {
                let l = DiffLine::addition(&line[1..], self.new_no);
                self.new_no = self.new_no.saturating_add(1);
                l
            }
            Some('-') => {
                let l = DiffLine::deletion(&line[1..], self.old_no);
                self.old_no = self.old_no.saturating_add(1);
                l
            }
            Some('\\') => DiffLine::marker(line),
            Some(' ') => {
                let l = DiffLine::context(&line[1..], self.old_no, self.new_no);
                self.old_no = self.old_no.saturating_add(1);
                self.new_no = self.new_no.saturating_add(1);
                l
            }
            _ => {
                let l = DiffLine::context(line, self.old_no, self.new_no);
                self.old_no = self.old_no.saturating_add(1);
                self.new_no = self.new_no.saturating_add(1);
                l
            }
        };

        if let Some(hunk) = self.hunk.as_mut() {
            hunk.lines.push(parsed);
        }
    }

    fn finish_hunk(&mut self) {
        let Some(mut hunk) = self.hunk.take() else {
            return;
        };

        if self.synthetic {
            hunk.old_count = hunk.lines.iter().filter(|l| l.old_line.is_some()).count() as u32;
            hunk.new_count = hunk.lines.iter().filter(|l| l.new_line.is_some()).count() as u32;
            hunk.header = Hunk::new(hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count)
                .header;
            self.synthetic = false;
        }

        if self.file.is_none() {
            self.file = Some(FileDiff::new(PLACEHOLDER_PATH));
        }
        if let Some(file) = self.file.as_mut() {
            file.hunks.push(hunk);
        }
    }

    fn finish_file(&mut self) {
        self.finish_hunk();
        if let Some(mut file) = self.file.take() {
            file.recalculate_stats();
            self.files.push(file);
        }
        self.old_no = 1;
        self.new_no = 1;
    }

    fn finish(mut self) -> Vec<FileDiff> {
        self.finish_file();
        self.files
    }
}

/// Parse diff text by line prefixes. Always yields at least one file.
pub(super) fn parse(diff_text: &str) -> Vec<FileDiff> {
    let mut builder = Builder::new();
    let mut lines = diff_text.lines().peekable();

    while let Some(line) = lines.next() {
        if let Some(source) = line.strip_prefix("--- ") {
            if let Some(target) = lines.peek().and_then(|next| next.strip_prefix("+++ ")) {
                builder.start_file(source, target);
                lines.next();
                continue;
            }
        }

        if line.starts_with("diff --git ") {
            builder.finish_file();
        } else if line.starts_with("@@") {
            builder.start_hunk(line);
        } else if builder.hunk.is_none() && is_git_metadata(line) {
            // index, mode and rename lines carry nothing to draw
            continue;
        } else {
            builder.push_body(line);
        }
    }

    let files = builder.finish();
    if files.is_empty() {
        vec![FileDiff::new(PLACEHOLDER_PATH)]
    } else {
        files
    }
}

fn is_git_metadata(line: &str) -> bool {
    const PREFIXES: [&str; 10] = [
        "index ",
        "new file mode",
        "deleted file mode",
        "old mode",
        "new mode",
        "similarity index",
        "rename from",
        "rename to",
        "Binary files",
        "diff ",
    ];
    PREFIXES.iter().any(|p| line.starts_with(p))
}
