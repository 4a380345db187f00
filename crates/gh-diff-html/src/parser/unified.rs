//! Parse canonical unified diff text into structured file diffs.

use super::lenient;
use crate::model::{DiffLine, FileDiff, FileStatus, Hunk, LineKind};
use thiserror::Error;
use unidiff::{Hunk as UnidiffHunk, Line as UnidiffLine, PatchSet, PatchedFile};

/// Errors that can occur during strict diff parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse diff: {0}")]
    ParseFailed(String),
    #[error("Diff contains no hunks")]
    NoHunks,
}

/// Parse a unified diff string into file diffs.
///
/// The strict `unidiff` parser is tried first because it validates hunk
/// ranges. Text it rejects (hand-written diffs, miscounted hunks, headers
/// without any `@@` marker) goes through the lenient line-prefix parser, so
/// this function never fails.
///
/// # Example
/// ```
/// let files = gh_diff_html::parse_unified_diff("--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\n");
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].additions, 1);
/// ```
pub fn parse_unified_diff(diff_text: &str) -> Vec<FileDiff> {
    match parse_strict(diff_text) {
        Ok(files) => files,
        Err(e) => {
            log::debug!("Strict diff parse failed ({}), using lenient parser", e);
            lenient::parse(diff_text)
        }
    }
}

fn parse_strict(diff_text: &str) -> Result<Vec<FileDiff>, ParseError> {
    // unidiff panics on a target header it cannot pair with a source header
    if has_unpaired_target_header(diff_text) {
        return Err(ParseError::ParseFailed(
            "'+++' header without a preceding '---' header".to_string(),
        ));
    }

    let mut patch_set = PatchSet::new();
    patch_set
        .parse(diff_text)
        .map_err(|e| ParseError::ParseFailed(e.to_string()))?;

    let files = patch_set
        .files()
        .iter()
        .map(parse_patched_file)
        .collect::<Result<Vec<_>, _>>()?;

    if files.is_empty() || files.iter().all(|f| f.hunks.is_empty()) {
        return Err(ParseError::NoHunks);
    }

    Ok(files)
}

/// Whether some `+++ ` line is not directly preceded by a `--- ` line.
fn has_unpaired_target_header(diff_text: &str) -> bool {
    let mut previous = "";
    for line in diff_text.lines() {
        if line.starts_with("+++ ") && !previous.starts_with("--- ") {
            return true;
        }
        previous = line;
    }
    false
}

fn parse_patched_file(file: &PatchedFile) -> Result<FileDiff, ParseError> {
    let target = clean_path(&file.target_file);
    let source = clean_path(&file.source_file);

    let display = if target == "/dev/null" || target.is_empty() {
        source.clone()
    } else {
        target.clone()
    };
    let mut file_diff = FileDiff::new(display);

    // Determine file status
    file_diff.status = determine_status(&source, &target);

    // Set old path if different
    if source != target && !source.is_empty() && source != "/dev/null" {
        file_diff.old_path = Some(source);
    }

    // Parse hunks
    for hunk in file.hunks() {
        file_diff.hunks.push(parse_hunk(hunk)?);
    }

    file_diff.recalculate_stats();
    Ok(file_diff)
}

fn parse_hunk(hunk: &UnidiffHunk) -> Result<Hunk, ParseError> {
    let mut parsed = Hunk::new(
        hunk.source_start as u32,
        hunk.source_length as u32,
        hunk.target_start as u32,
        hunk.target_length as u32,
    );

    // Keep function context from the section header
    let header = hunk.section_header.trim();
    if !header.is_empty() {
        parsed.header = format!("{} {}", parsed.header, header);
    }

    for line in hunk.lines() {
        parsed.lines.push(parse_line(line)?);
    }

    Ok(parsed)
}

fn parse_line(line: &UnidiffLine) -> Result<DiffLine, ParseError> {
    let content = line.value.to_string();
    let source_line = line.source_line_no.map(|n| n as u32);
    let target_line = line.target_line_no.map(|n| n as u32);

    let kind = match line.line_type.as_str() {
        " " => LineKind::Context,
        "+" => LineKind::Addition,
        "-" => LineKind::Deletion,
        "\\" => LineKind::Marker, // "\ No newline at end of file"
        other => {
            return Err(ParseError::ParseFailed(format!(
                "unknown line type {:?}",
                other
            )))
        }
    };

    Ok(DiffLine {
        kind,
        content,
        old_line: source_line,
        new_line: target_line,
    })
}

pub(super) fn determine_status(source: &str, target: &str) -> FileStatus {
    if source == "/dev/null" || source.is_empty() {
        FileStatus::Added
    } else if target == "/dev/null" || target.is_empty() {
        FileStatus::Deleted
    } else if source != target {
        FileStatus::Renamed
    } else {
        FileStatus::Modified
    }
}

/// Clean the path by removing a/b prefixes and trailing timestamps.
pub(super) fn clean_path(path: &str) -> String {
    let path = path.split('\t').next().unwrap_or(path).trim();

    // Remove common prefixes
    if let Some(stripped) = path.strip_prefix("a/") {
        return stripped.to_string();
    }
    if let Some(stripped) = path.strip_prefix("b/") {
        return stripped.to_string();
    }

    path.to_string()
}
