//! Full-document wrapper around a markup fragment.

use super::RenderOptions;

pub(crate) const TITLE: &str = "Unified Diff Visualization";

pub(crate) const DIFF2HTML_CSS: &str =
    "https://cdn.jsdelivr.net/npm/diff2html/bundles/css/diff2html.min.css";

pub(crate) const DIFF2HTML_UI_JS: &str =
    "https://cdn.jsdelivr.net/npm/diff2html/bundles/js/diff2html-ui.min.js";

const BASE_STYLES: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #ffffff;
            font-size: 14px;
        }
        .d2h-wrapper {
            max-width: none;
            overflow-x: auto;
        }
        .d2h-file-header {
            font-weight: 600;
            background-color: #f6f8fa;
        }"#;

// Rasterized at a fixed viewport: nothing may overflow horizontally.
const IMAGE_STYLES: &str = r#"
        .d2h-diff-table {
            font-size: 11px;
            table-layout: fixed;
            width: 100%;
        }
        .d2h-code-line,
        .d2h-code-line-ctn,
        .d2h-code-side-line,
        .d2h-code-line pre,
        .d2h-code-line code {
            word-wrap: break-word !important;
            word-break: break-all !important;
            white-space: pre-wrap !important;
            overflow-wrap: break-word !important;
            max-width: 500px !important;
            font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', monospace !important;
            font-size: 10px !important;
        }
        .d2h-diff-tbody tr td {
            max-width: 500px !important;
            overflow-wrap: break-word !important;
            word-break: break-all !important;
            white-space: pre-wrap !important;
            vertical-align: top;
        }
        .d2h-code-side-emptyplaceholder,
        .d2h-code-side-line {
            max-width: 450px !important;
            word-wrap: break-word !important;
            word-break: break-all !important;
            white-space: pre-wrap !important;
        }
        .d2h-diff-table td.d2h-code-linenumber + td {
            max-width: 480px !important;
            word-wrap: break-word !important;
            word-break: break-all !important;
            white-space: pre-wrap !important;
        }"#;

const SCREEN_STYLES: &str = r#"
        /* Minimal overrides, diff2html defaults otherwise */"#;

const RESPONSIVE_STYLES: &str = r#"
        @media (max-width: 768px) {
            body { padding: 10px; font-size: 12px; }
        }"#;

pub(crate) const HIGHLIGHT_SCRIPT: &str = r#"    <script src="https://cdn.jsdelivr.net/npm/diff2html/bundles/js/diff2html-ui.min.js"></script>
    <script>
        document.addEventListener('DOMContentLoaded', function() {
            if (typeof Diff2HtmlUI !== 'undefined') {
                const targetElement = document.querySelector('.d2h-wrapper');
                if (targetElement) {
                    const diff2htmlUi = new Diff2HtmlUI(targetElement);
                    diff2htmlUi.highlightCode();
                }
            }
        });
    </script>
"#;

/// Pieces of a page handed to [`wrap`].
pub(crate) struct Page<'a> {
    pub title: &'a str,
    pub styles: String,
    pub body: &'a str,
    pub scripts: &'a str,
}

/// Inline CSS for the given options.
pub(crate) fn styles(opts: &RenderOptions) -> String {
    let mut css = String::from(BASE_STYLES);
    css.push_str(if opts.for_image_output {
        IMAGE_STYLES
    } else {
        SCREEN_STYLES
    });
    css.push_str(RESPONSIVE_STYLES);
    css
}

pub(crate) fn wrap(page: &Page<'_>) -> String {
    let mut html = String::with_capacity(page.body.len() + 4096);

    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html lang=\"en\">\n");
    html.push_str("<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("    <title>{}</title>\n", page.title));
    html.push_str(&format!(
        "    <link rel=\"stylesheet\" href=\"{}\" />\n",
        DIFF2HTML_CSS
    ));
    html.push_str("    <style>");
    html.push_str(&page.styles);
    html.push_str("\n    </style>\n");
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    html.push_str(page.body);
    html.push_str(page.scripts);
    html.push_str("</body>\n");
    html.push_str("</html>\n");

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_structure() {
        let html = wrap(&Page {
            title: TITLE,
            styles: styles(&RenderOptions::default()),
            body: "<p>hi</p>\n",
            scripts: "",
        });

        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(html.contains("<title>Unified Diff Visualization</title>"));
        assert!(html.contains(DIFF2HTML_CSS));
        assert!(html.contains("<body>\n<p>hi</p>\n</body>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_highlight_script_loads_ui_bundle() {
        assert!(HIGHLIGHT_SCRIPT.contains(DIFF2HTML_UI_JS));
    }
}
