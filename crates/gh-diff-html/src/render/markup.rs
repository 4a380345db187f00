//! Diff-to-markup conversion in the diff2html class layout.

use super::{escape_html, Layout, MarkupConfig};
use crate::model::{DiffLine, FileDiff, Hunk, LineKind};

/// One visual row of a hunk after change blocks have been matched.
enum Row<'a> {
    /// Context or marker line, shown on both sides.
    Shared(&'a DiffLine),
    /// A deleted and/or added line sharing a row in side-by-side view.
    Change {
        deleted: Option<Cell<'a>>,
        added: Option<Cell<'a>>,
    },
}

/// A changed line with its already-escaped content.
struct Cell<'a> {
    line: &'a DiffLine,
    html: String,
}

/// Render the file list and per-file diff tables.
pub fn render_fragment(files: &[FileDiff], config: &MarkupConfig) -> String {
    let mut out = String::new();

    if config.show_file_list {
        out.push_str(&render_file_list(files));
    }

    out.push_str("<div class=\"d2h-wrapper d2h-light-color-scheme\">\n");
    for (idx, file) in files.iter().enumerate() {
        out.push_str(&render_file(idx, file, config));
    }
    out.push_str("</div>\n");

    out
}

fn file_anchor(idx: usize) -> String {
    format!("d2h-file-{}", idx)
}

fn render_file_list(files: &[FileDiff]) -> String {
    let mut out = String::new();

    out.push_str("<div class=\"d2h-file-list-wrapper d2h-light-color-scheme\">\n");
    out.push_str("    <div class=\"d2h-file-list-header\">\n");
    out.push_str(&format!(
        "        <span class=\"d2h-file-list-title\">Files changed ({})</span>\n",
        files.len()
    ));
    out.push_str("    </div>\n");
    out.push_str("    <ol class=\"d2h-file-list\">\n");

    for (idx, file) in files.iter().enumerate() {
        out.push_str(&format!(
            concat!(
                "        <li class=\"d2h-file-list-line\">",
                "<span class=\"d2h-file-name-wrapper\">",
                "<a href=\"#{}\" class=\"d2h-file-name\">{}</a>",
                "<span class=\"d2h-file-stats\">",
                "<span class=\"d2h-lines-added\">+{}</span>",
                "<span class=\"d2h-lines-deleted\">-{}</span>",
                "</span></span></li>\n"
            ),
            file_anchor(idx),
            escape_html(&file.display_name()),
            file.additions,
            file.deletions
        ));
    }

    out.push_str("    </ol>\n");
    out.push_str("</div>\n");
    out
}

fn render_file(idx: usize, file: &FileDiff, config: &MarkupConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "<div id=\"{}\" class=\"d2h-file-wrapper\" data-lang=\"{}\">\n",
        file_anchor(idx),
        escape_html(file.language())
    ));
    out.push_str(&format!(
        concat!(
            "    <div class=\"d2h-file-header\">",
            "<span class=\"d2h-file-name-wrapper\">",
            "<span class=\"d2h-file-name\">{}</span>",
            "<span class=\"d2h-tag {} {}-tag\">{}</span>",
            "</span></div>\n"
        ),
        escape_html(&file.display_name()),
        file.status.css_class(),
        file.status.css_class(),
        file.status.tag()
    ));

    match config.layout {
        Layout::LineByLine => out.push_str(&render_line_by_line(file, config)),
        Layout::SideBySide => out.push_str(&render_side_by_side(file, config)),
    }

    out.push_str("</div>\n");
    out
}

fn table(rows: &str) -> String {
    format!(
        concat!(
            "<div class=\"d2h-code-wrapper\"><table class=\"d2h-diff-table\">",
            "<tbody class=\"d2h-diff-tbody\">\n{}</tbody></table></div>"
        ),
        rows
    )
}

const EMPTY_FILE_ROW: &str = concat!(
    "<tr><td class=\"d2h-info\">",
    "<div class=\"d2h-code-line\">File without changes</div>",
    "</td></tr>\n"
);

fn render_line_by_line(file: &FileDiff, config: &MarkupConfig) -> String {
    let mut rows = String::new();

    if file.hunks.is_empty() {
        rows.push_str(EMPTY_FILE_ROW);
    }

    for hunk in &file.hunks {
        rows.push_str(&format!(
            concat!(
                "<tr><td class=\"d2h-code-linenumber d2h-info\"></td>",
                "<td class=\"d2h-info\"><div class=\"d2h-code-line\">{}</div></td></tr>\n"
            ),
            escape_html(&hunk.header)
        ));

        let mut deleted = Vec::new();
        let mut added = Vec::new();
        for row in match_rows(hunk, config) {
            match row {
                Row::Shared(line) => {
                    flush_line_by_line(&mut rows, &mut deleted, &mut added);
                    rows.push_str(&line_row(line, &escape_html(&line.content)));
                }
                Row::Change {
                    deleted: d,
                    added: a,
                } => {
                    deleted.extend(d);
                    added.extend(a);
                }
            }
        }
        flush_line_by_line(&mut rows, &mut deleted, &mut added);
    }

    format!("<div class=\"d2h-file-diff\">{}</div>\n", table(&rows))
}

/// Emit a change block: all deletions, then all additions.
fn flush_line_by_line(rows: &mut String, deleted: &mut Vec<Cell<'_>>, added: &mut Vec<Cell<'_>>) {
    for cell in deleted.drain(..).chain(added.drain(..)) {
        rows.push_str(&line_row(cell.line, &cell.html));
    }
}

fn line_row(line: &DiffLine, content_html: &str) -> String {
    let class = line.kind.css_class();
    format!(
        concat!(
            "<tr><td class=\"d2h-code-linenumber {cls}\">",
            "<div class=\"line-num1\">{old}</div><div class=\"line-num2\">{new}</div></td>",
            "<td class=\"{cls}\"><div class=\"d2h-code-line\">",
            "<span class=\"d2h-code-line-prefix\">{prefix}</span>",
            "<span class=\"d2h-code-line-ctn\">{content}</span>",
            "</div></td></tr>\n"
        ),
        cls = class,
        old = number(line.old_line),
        new = number(line.new_line),
        prefix = prefix_html(line.kind),
        content = content_html
    )
}

fn render_side_by_side(file: &FileDiff, config: &MarkupConfig) -> String {
    let mut left = String::new();
    let mut right = String::new();

    if file.hunks.is_empty() {
        left.push_str(EMPTY_FILE_ROW);
        right.push_str(EMPTY_FILE_ROW);
    }

    for hunk in &file.hunks {
        left.push_str(&format!(
            concat!(
                "<tr><td class=\"d2h-code-side-linenumber d2h-info\"></td>",
                "<td class=\"d2h-info\"><div class=\"d2h-code-side-line\">{}</div></td></tr>\n"
            ),
            escape_html(&hunk.header)
        ));
        right.push_str(concat!(
            "<tr><td class=\"d2h-code-side-linenumber d2h-info\"></td>",
            "<td class=\"d2h-info\"><div class=\"d2h-code-side-line\"></div></td></tr>\n"
        ));

        for row in match_rows(hunk, config) {
            match row {
                Row::Shared(line) => {
                    let html = escape_html(&line.content);
                    left.push_str(&side_row(line, line.old_line, &html));
                    right.push_str(&side_row(line, line.new_line, &html));
                }
                Row::Change { deleted, added } => {
                    left.push_str(
                        &deleted
                            .map(|c| side_row(c.line, c.line.old_line, &c.html))
                            .unwrap_or_else(|| EMPTY_PLACEHOLDER_ROW.to_string()),
                    );
                    right.push_str(
                        &added
                            .map(|c| side_row(c.line, c.line.new_line, &c.html))
                            .unwrap_or_else(|| EMPTY_PLACEHOLDER_ROW.to_string()),
                    );
                }
            }
        }
    }

    format!(
        concat!(
            "<div class=\"d2h-files-diff\">\n",
            "<div class=\"d2h-file-side-diff\">{}</div>\n",
            "<div class=\"d2h-file-side-diff\">{}</div>\n",
            "</div>\n"
        ),
        table(&left),
        table(&right)
    )
}

const EMPTY_PLACEHOLDER_ROW: &str = concat!(
    "<tr><td class=\"d2h-code-side-linenumber d2h-code-side-emptyplaceholder d2h-cntx d2h-emptyplaceholder\"></td>",
    "<td class=\"d2h-cntx d2h-emptyplaceholder\">",
    "<div class=\"d2h-code-side-line d2h-code-side-emptyplaceholder\">",
    "<span class=\"d2h-code-line-prefix\">&nbsp;</span>",
    "<span class=\"d2h-code-line-ctn\"><br></span>",
    "</div></td></tr>\n"
);

fn side_row(line: &DiffLine, number_on_side: Option<u32>, content_html: &str) -> String {
    let class = line.kind.css_class();
    format!(
        concat!(
            "<tr><td class=\"d2h-code-side-linenumber {cls}\">{num}</td>",
            "<td class=\"{cls}\"><div class=\"d2h-code-side-line\">",
            "<span class=\"d2h-code-line-prefix\">{prefix}</span>",
            "<span class=\"d2h-code-line-ctn\">{content}</span>",
            "</div></td></tr>\n"
        ),
        cls = class,
        num = number(number_on_side),
        prefix = prefix_html(line.kind),
        content = content_html
    )
}

fn number(n: Option<u32>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

fn prefix_html(kind: LineKind) -> &'static str {
    match kind {
        LineKind::Context | LineKind::Marker => "&nbsp;",
        LineKind::Addition => "+",
        LineKind::Deletion => "-",
    }
}

/// Group a hunk into rows, pairing deleted and added lines of each change block.
fn match_rows<'a>(hunk: &'a Hunk, config: &MarkupConfig) -> Vec<Row<'a>> {
    let mut rows = Vec::new();
    let lines = &hunk.lines;
    let mut i = 0;

    while i < lines.len() {
        if !matches!(lines[i].kind, LineKind::Deletion | LineKind::Addition) {
            rows.push(Row::Shared(&lines[i]));
            i += 1;
            continue;
        }

        let del_start = i;
        while i < lines.len() && lines[i].kind == LineKind::Deletion {
            i += 1;
        }
        let add_start = i;
        while i < lines.len() && lines[i].kind == LineKind::Addition {
            i += 1;
        }

        let deleted = &lines[del_start..add_start];
        let added = &lines[add_start..i];
        rows.extend(match_block(deleted, added, config));
    }

    rows
}

fn match_block<'a>(
    deleted: &'a [DiffLine],
    added: &'a [DiffLine],
    config: &MarkupConfig,
) -> Vec<Row<'a>> {
    let comparable = deleted.len() <= config.max_line_size_in_block_for_comparison
        && added.len() <= config.max_line_size_in_block_for_comparison;

    (0..deleted.len().max(added.len()))
        .map(|idx| {
            let del = deleted.get(idx);
            let add = added.get(idx);

            match (del, add) {
                (Some(d), Some(a))
                    if comparable
                        && d.content.len() <= config.max_line_length_highlight
                        && a.content.len() <= config.max_line_length_highlight =>
                {
                    let (del_html, add_html) = highlight_pair(&d.content, &a.content);
                    Row::Change {
                        deleted: Some(Cell {
                            line: d,
                            html: del_html,
                        }),
                        added: Some(Cell {
                            line: a,
                            html: add_html,
                        }),
                    }
                }
                _ => Row::Change {
                    deleted: del.map(|d| Cell {
                        line: d,
                        html: escape_html(&d.content),
                    }),
                    added: add.map(|a| Cell {
                        line: a,
                        html: escape_html(&a.content),
                    }),
                },
            }
        })
        .collect()
}

/// Mark the differing middle of two paired lines with `<del>`/`<ins>`.
fn highlight_pair(old: &str, new: &str) -> (String, String) {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let prefix = old_chars
        .iter()
        .zip(&new_chars)
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = old_chars.len().min(new_chars.len()) - prefix;
    let suffix = old_chars
        .iter()
        .rev()
        .zip(new_chars.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let wrap = |chars: &[char], tag: &str| -> String {
        let text: String = chars.iter().collect();
        let head: String = chars[..prefix].iter().collect();
        let middle: String = chars[prefix..chars.len() - suffix].iter().collect();
        let tail: String = chars[chars.len() - suffix..].iter().collect();
        if middle.is_empty() {
            return escape_html(&text);
        }
        format!(
            "{}<{tag}>{}</{tag}>{}",
            escape_html(&head),
            escape_html(&middle),
            escape_html(&tail),
            tag = tag
        )
    };

    (wrap(&old_chars, "del"), wrap(&new_chars, "ins"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_unified_diff;
    use pretty_assertions::assert_eq;

    fn config(layout: Layout) -> MarkupConfig {
        MarkupConfig {
            layout,
            show_file_list: true,
            max_line_size_in_block_for_comparison: 200,
            max_line_length_highlight: 10_000,
        }
    }

    const DIFF: &str = "--- a/f.rs\n+++ b/f.rs\n@@ -1,3 +1,3 @@\n keep\n-let x = 1;\n+let x = 2;\n tail\n";

    #[test]
    fn test_highlight_pair_marks_middle() {
        let (old, new) = highlight_pair("let x = 1;", "let x = 2;");
        assert_eq!(old, "let x = <del>1</del>;");
        assert_eq!(new, "let x = <ins>2</ins>;");
    }

    #[test]
    fn test_highlight_pair_insertion_only() {
        let (old, new) = highlight_pair("ab", "axb");
        assert_eq!(old, "ab");
        assert_eq!(new, "a<ins>x</ins>b");
    }

    #[test]
    fn test_highlight_pair_escapes() {
        let (old, new) = highlight_pair("<a>", "<b>");
        assert_eq!(old, "&lt;<del>a</del>&gt;");
        assert_eq!(new, "&lt;<ins>b</ins>&gt;");
    }

    #[test]
    fn test_side_by_side_pairs_changes() {
        let files = parse_unified_diff(DIFF);
        let html = render_fragment(&files, &config(Layout::SideBySide));

        assert!(html.contains("<del>1</del>"));
        assert!(html.contains("<ins>2</ins>"));
        assert_eq!(html.matches("d2h-file-side-diff").count(), 2);
        assert!(!html.contains("d2h-emptyplaceholder"));
    }

    #[test]
    fn test_side_by_side_unbalanced_block_gets_placeholder() {
        let files = parse_unified_diff("--- a/f\n+++ b/f\n@@ -1,1 +1,2 @@\n-a\n+b\n+c\n");
        let html = render_fragment(&files, &config(Layout::SideBySide));

        assert_eq!(html.matches("d2h-code-side-emptyplaceholder d2h-cntx").count(), 1);
    }

    #[test]
    fn test_line_by_line_orders_deletions_first() {
        let files = parse_unified_diff("--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n-a\n-b\n+c\n+d\n");
        let html = render_fragment(&files, &config(Layout::LineByLine));

        let del_b = html.find("<del>b</del>").unwrap();
        let ins_c = html.find("<ins>c</ins>").unwrap();
        assert!(del_b < ins_c);
    }

    #[test]
    fn test_large_block_not_compared() {
        let mut cfg = config(Layout::LineByLine);
        cfg.max_line_size_in_block_for_comparison = 0;

        let files = parse_unified_diff(DIFF);
        let html = render_fragment(&files, &cfg);
        assert!(!html.contains("<del>"));
        assert!(html.contains("let x = 2;"));
    }

    #[test]
    fn test_long_lines_not_highlighted() {
        let mut cfg = config(Layout::SideBySide);
        cfg.max_line_length_highlight = 5;

        let files = parse_unified_diff(DIFF);
        assert!(!render_fragment(&files, &cfg).contains("<ins>"));
    }

    #[test]
    fn test_file_list_stats() {
        let files = parse_unified_diff(DIFF);
        let html = render_fragment(&files, &config(Layout::SideBySide));

        assert!(html.contains("<a href=\"#d2h-file-0\" class=\"d2h-file-name\">f.rs</a>"));
        assert!(html.contains("<span class=\"d2h-lines-added\">+1</span>"));
        assert!(html.contains("<span class=\"d2h-lines-deleted\">-1</span>"));
        assert!(html.contains("data-lang=\"rs\""));
        assert!(html.contains("d2h-changed-tag"));
    }

    #[test]
    fn test_empty_file_row() {
        let html = render_fragment(&[FileDiff::new("x")], &config(Layout::LineByLine));
        assert!(html.contains("File without changes"));
    }
}
