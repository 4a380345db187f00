//! Auto-delete notice for pages that are only reachable for a limited time.

const BANNER_STYLE: &str = concat!(
    "background: #fff3cd; border: 1px solid #ffeaa7; color: #856404; ",
    "padding: 12px; margin-bottom: 20px; border-radius: 4px; text-align: center; ",
    "position: relative;"
);

const CLOSE_STYLE: &str = concat!(
    "position: absolute; top: 6px; right: 10px; background: none; border: none; ",
    "color: #856404; font-size: 18px; line-height: 1; cursor: pointer;"
);

/// Insert an expiry banner and a client-side countdown into a rendered page.
///
/// The deadline is computed in the browser from page load, so identical
/// inputs give identical output. A `ttl_minutes` of zero leaves the page
/// untouched.
pub fn with_expiry_banner(html: &str, ttl_minutes: u32) -> String {
    if ttl_minutes == 0 {
        return html.to_string();
    }

    let banner = format!(
        concat!(
            "<div id=\"expiry-notice\" style=\"{style}\">\n",
            "    <strong>Notice:</strong> This page will auto-delete in {ttl} minutes",
            " (<span id=\"expiry-countdown\">{ttl}:00</span> remaining)\n",
            "    <button type=\"button\" id=\"expiry-close\" aria-label=\"Dismiss notice\"",
            " style=\"{close_style}\"",
            " onclick=\"document.getElementById('expiry-notice').style.display='none'\">",
            "&times;</button>\n",
            "</div>\n"
        ),
        style = BANNER_STYLE,
        close_style = CLOSE_STYLE,
        ttl = ttl_minutes
    );

    let script = format!(
        r#"    <script>
        (function() {{
            const expiresAt = Date.now() + {ttl} * 60 * 1000;
            const countdown = document.getElementById('expiry-countdown');
            function tick() {{
                const left = expiresAt - Date.now();
                if (left <= 0) {{
                    document.body.innerHTML =
                        '<div style="text-align: center; padding: 60px; font-size: 18px; color: #666;">' +
                        'This diff has expired and is no longer available.</div>';
                    return;
                }}
                const minutes = Math.floor(left / 60000);
                const seconds = Math.floor((left % 60000) / 1000);
                if (countdown) {{
                    countdown.textContent = minutes + ':' + String(seconds).padStart(2, '0');
                }}
                setTimeout(tick, 1000);
            }}
            tick();
        }})();
    </script>
"#,
        ttl = ttl_minutes
    );

    let mut out = String::with_capacity(html.len() + banner.len() + script.len());

    match html.find("<body>") {
        Some(idx) => {
            let after = idx + "<body>".len();
            // keep the newline that follows the tag in front of the banner
            let after = if html[after..].starts_with('\n') {
                after + 1
            } else {
                after
            };
            out.push_str(&html[..after]);
            out.push_str(&banner);
            out.push_str(&html[after..]);
        }
        None => {
            out.push_str(&banner);
            out.push_str(html);
        }
    }

    match out.rfind("</body>") {
        Some(idx) => out.insert_str(idx, &script),
        None => out.push_str(&script),
    }

    out
}
