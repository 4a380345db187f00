//! Turn arbitrary diff-like input into canonical unified-diff text.
//!
//! Accepted inputs:
//! - an already unified (or git-style) diff, passed through untouched
//! - bare or partially prefixed lines, which get synthetic headers
//! - a JSON dry-run edit report embedding the diff as `diff` or `formattedDiff`
//!
//! Normalization never fails. Input that cannot be interpreted still comes
//! out as something the renderer can draw.

use crate::model::DiffDocument;
use serde_json::Value;
use std::borrow::Cow;

/// Path used in synthetic headers when the caller gave no hint.
pub const PLACEHOLDER_PATH: &str = "file.txt";

/// Byte order mark some editors put in front of pasted text.
const BOM: char = '\u{feff}';

/// Fields of a dry-run report that may carry the diff, in lookup order.
const DRY_RUN_FIELDS: [&str; 2] = ["diff", "formattedDiff"];

/// Normalize raw input into a [`DiffDocument`].
///
/// # Arguments
/// * `raw` - Diff text or dry-run report
/// * `hint_old_path` - Path of the original file, if known
/// * `hint_new_path` - Path of the modified file, if known
pub fn normalize(
    raw: &str,
    hint_old_path: Option<&str>,
    hint_new_path: Option<&str>,
) -> DiffDocument {
    let raw = raw.strip_prefix(BOM).unwrap_or(raw);
    let text = unwrap_dry_run(raw);
    let hint_old = hint_old_path.filter(|p| !p.trim().is_empty());
    let hint_new = hint_new_path.filter(|p| !p.trim().is_empty());

    if is_unified(&text) {
        let (header_old, header_new) = header_paths(&text);
        return DiffDocument::new(
            text.into_owned(),
            hint_old.map(str::to_string).or(header_old),
            hint_new.map(str::to_string).or(header_new),
        );
    }

    log::debug!("Input has no unified headers, synthesizing them");

    let old = hint_old.or(hint_new).unwrap_or(PLACEHOLDER_PATH);
    let new = hint_new.or(hint_old).unwrap_or(PLACEHOLDER_PATH);

    DiffDocument::new(
        synthesize(&text, old, new),
        hint_old.map(str::to_string),
        hint_new.map(str::to_string),
    )
}

/// Replace a JSON dry-run report by the diff it embeds.
///
/// Returns the input unchanged when it is not JSON or carries no diff field.
pub fn unwrap_dry_run(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with('{') {
        return Cow::Borrowed(raw);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => match find_diff_field(&value) {
            Some(diff) => {
                log::debug!("Unwrapped diff from dry-run report");
                Cow::Owned(diff.to_string())
            }
            None => Cow::Borrowed(raw),
        },
        Err(e) => {
            log::debug!("Input is not a JSON dry-run report: {}", e);
            Cow::Borrowed(raw)
        }
    }
}

fn find_diff_field(value: &Value) -> Option<&str> {
    let object = value.as_object()?;

    let direct = DRY_RUN_FIELDS
        .iter()
        .find_map(|field| object.get(*field).and_then(Value::as_str));
    if direct.is_some() {
        return direct;
    }

    // One level down, e.g. {"result": {"diff": "..."}}
    object.values().filter(|v| v.is_object()).find_map(|nested| {
        DRY_RUN_FIELDS
            .iter()
            .find_map(|field| nested.get(*field).and_then(Value::as_str))
    })
}

/// Permissive check: both header markers appear anywhere in the text.
fn is_unified(text: &str) -> bool {
    text.contains("---") && text.contains("+++")
}

/// Re-emit bare or partially prefixed lines as a unified diff body.
fn synthesize(text: &str, old_path: &str, new_path: &str) -> String {
    let mut lines = vec![format!("--- a/{}", old_path), format!("+++ b/{}", new_path)];

    for line in text.lines() {
        if line.starts_with("@@")
            || line.starts_with('+')
            || line.starts_with('-')
            || line.starts_with(' ')
        {
            lines.push(line.to_string());
        } else {
            // Bare line (including an empty one) becomes context
            lines.push(format!(" {}", line));
        }
    }

    let mut out = lines.join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Extract old/new paths from the first `---`/`+++` header lines.
fn header_paths(text: &str) -> (Option<String>, Option<String>) {
    let mut old = None;
    let mut new = None;

    for line in text.lines() {
        if old.is_none() {
            if let Some(rest) = line.strip_prefix("--- ") {
                old = Some(clean_header_path(rest));
                continue;
            }
        }
        if new.is_none() {
            if let Some(rest) = line.strip_prefix("+++ ") {
                new = Some(clean_header_path(rest));
            }
        }
        if old.is_some() && new.is_some() {
            break;
        }
    }

    (old.flatten(), new.flatten())
}

/// Strip a/ b/ prefixes and trailing timestamps; `/dev/null` yields nothing.
fn clean_header_path(raw: &str) -> Option<String> {
    let path = raw.split('\t').next().unwrap_or(raw).trim();
    if path.is_empty() || path == "/dev/null" {
        return None;
    }

    let path = path
        .strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path);
    Some(path.to_string())
}
