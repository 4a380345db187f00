//! Delivering a page inside the response itself.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// `data:` URI carrying the whole page.
pub fn data_uri(html: &str) -> String {
    format!("data:text/html;base64,{}", STANDARD.encode(html))
}
