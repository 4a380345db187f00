//! Access-code overlay for shared pages.
//!
//! The check runs in the browser against a hash embedded in the page, so
//! it only keeps casual visitors out. Anyone with the raw file can read
//! the diff.

use super::{document, escape_html, render_fragment, MarkupConfig, RenderOptions};
use crate::model::DiffDocument;
use crate::parser::parse_unified_diff;

/// Settings of the access gate drawn over a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    /// Code the visitor has to type.
    pub secret: String,
    /// Shown in the overlay; zero hides the line.
    pub ttl_minutes: u32,
    /// Human readable security label shown under the title.
    pub label: String,
}

const GATE_STYLES: &str = r#"
        #access-gate {
            position: fixed;
            inset: 0;
            background: #f6f8fa;
            display: flex;
            align-items: center;
            justify-content: center;
            z-index: 1000;
        }
        #access-gate form {
            background: #ffffff;
            border: 1px solid #d0d7de;
            border-radius: 6px;
            padding: 24px 32px;
            text-align: center;
            min-width: 320px;
        }
        #access-gate input {
            font-size: 16px;
            padding: 6px 10px;
            margin: 12px 0;
            width: 100%;
            box-sizing: border-box;
        }
        #access-error {
            color: #cf222e;
            display: none;
        }
        #diff-content {
            display: none;
        }"#;

/// 32-bit string hash, bit-compatible with the `simpleHash` function
/// embedded in gated pages.
///
/// # Example
/// ```
/// assert_eq!(gh_diff_html::simple_hash("ab"), "c21");
/// ```
pub fn simple_hash(input: &str) -> String {
    let hash = input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    format!("{:x}", i64::from(hash).abs())
}

/// Render a document whose diff is hidden behind an access-code form.
pub fn render_gated(doc: &DiffDocument, opts: &RenderOptions, gate: &AccessGate) -> String {
    let files = parse_unified_diff(doc.canonical_text());
    let fragment = render_fragment(&files, &MarkupConfig::from(opts));

    let expiry_line = if gate.ttl_minutes > 0 {
        format!(
            "            <p>Available for {} minutes.</p>\n",
            gate.ttl_minutes
        )
    } else {
        String::new()
    };

    let body = format!(
        concat!(
            "<div id=\"access-gate\">\n",
            "        <form id=\"access-form\">\n",
            "            <h2>Protected diff</h2>\n",
            "            <p>{label}</p>\n",
            "{expiry}",
            "            <input type=\"password\" id=\"access-code\" placeholder=\"Access code\" autocomplete=\"off\" autofocus>\n",
            "            <button type=\"submit\">View diff</button>\n",
            "            <p id=\"access-error\">Incorrect access code</p>\n",
            "        </form>\n",
            "</div>\n",
            "<div id=\"diff-content\">\n{fragment}</div>\n"
        ),
        label = escape_html(&gate.label),
        expiry = expiry_line,
        fragment = fragment
    );

    let highlight = if opts.highlight {
        concat!(
            "                if (typeof Diff2HtmlUI !== 'undefined') {\n",
            "                    const target = document.querySelector('.d2h-wrapper');\n",
            "                    if (target) { new Diff2HtmlUI(target).highlightCode(); }\n",
            "                }\n"
        )
    } else {
        ""
    };
    let ui_script = if opts.highlight {
        format!("    <script src=\"{}\"></script>\n", document::DIFF2HTML_UI_JS)
    } else {
        String::new()
    };

    let scripts = format!(
        r#"{ui_script}    <script>
        (function() {{
            const expected = '{expected}';
            function simpleHash(str) {{
                let hash = 0;
                for (let i = 0; i < str.length; i++) {{
                    hash = ((hash << 5) - hash) + str.charCodeAt(i);
                    hash = hash & hash;
                }}
                return Math.abs(hash).toString(16);
            }}
            document.getElementById('access-form').addEventListener('submit', function(event) {{
                event.preventDefault();
                const code = document.getElementById('access-code').value.trim();
                if (simpleHash(code) !== expected) {{
                    document.getElementById('access-error').style.display = 'block';
                    return;
                }}
                document.getElementById('access-gate').remove();
                document.getElementById('diff-content').style.display = 'block';
{highlight}            }});
        }})();
    </script>
"#,
        ui_script = ui_script,
        expected = simple_hash(&gate.secret),
        highlight = highlight
    );

    let mut styles = document::styles(opts);
    styles.push_str(GATE_STYLES);

    document::wrap(&document::Page {
        title: document::TITLE,
        styles,
        body: &body,
        scripts: &scripts,
    })
}
