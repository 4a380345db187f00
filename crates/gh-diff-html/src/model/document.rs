/// Canonical unified-diff text plus the path hints recovered while building it.
///
/// Built by [`crate::normalize`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffDocument {
    canonical_text: String,
    old_path: Option<String>,
    new_path: Option<String>,
}

impl DiffDocument {
    pub(crate) fn new(
        canonical_text: String,
        old_path: Option<String>,
        new_path: Option<String>,
    ) -> Self {
        Self {
            canonical_text,
            old_path,
            new_path,
        }
    }

    pub fn canonical_text(&self) -> &str {
        &self.canonical_text
    }

    pub fn old_path(&self) -> Option<&str> {
        self.old_path.as_deref()
    }

    pub fn new_path(&self) -> Option<&str> {
        self.new_path.as_deref()
    }

    /// Old path for display, falling back to the new path and then the placeholder.
    pub fn display_old_path(&self) -> &str {
        self.old_path()
            .or(self.new_path())
            .unwrap_or(crate::PLACEHOLDER_PATH)
    }

    /// New path for display, falling back to the old path and then the placeholder.
    pub fn display_new_path(&self) -> &str {
        self.new_path()
            .or(self.old_path())
            .unwrap_or(crate::PLACEHOLDER_PATH)
    }
}
