//! Gist API data transfer objects
//!
//! Request and response bodies of the Gist endpoints. Only the fields the
//! share flow reads are modelled; everything else in the response is
//! ignored on deserialization.

use crate::RAW_HOST;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who can find a gist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed on the owner's profile and searchable
    Public,
    /// Secret gist, reachable only through its URL
    #[default]
    Private,
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Content of one file in a gist creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistFileContent {
    pub content: String,
}

/// Body of `POST /gists`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGist {
    /// Gist description
    pub description: String,

    /// Whether the gist is public
    pub public: bool,

    /// Files keyed by filename
    pub files: BTreeMap<String, GistFileContent>,
}

impl NewGist {
    /// A gist holding exactly one file
    pub fn single_file(
        description: impl Into<String>,
        visibility: Visibility,
        filename: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            filename.into(),
            GistFileContent {
                content: content.into(),
            },
        );

        Self {
            description: description.into(),
            public: visibility.is_public(),
            files,
        }
    }
}

/// Owner of a gist
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GistOwner {
    pub login: String,
}

/// A file of a created gist
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GistFile {
    pub filename: Option<String>,

    /// Raw URL pinned to the current revision
    pub raw_url: Option<String>,
}

/// A gist as returned by the API after creation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedGist {
    /// Gist ID
    pub id: String,

    /// Gist page on github.com
    pub html_url: String,

    /// Owner (absent for anonymous gists)
    pub owner: Option<GistOwner>,

    /// Files keyed by filename
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,

    /// When the gist was created
    pub created_at: Option<DateTime<Utc>>,
}

impl CreatedGist {
    /// Owner login, if the API reported one
    pub fn owner_login(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.login.as_str())
    }

    /// Raw URL of `filename` that always serves the latest revision
    ///
    /// Built from owner and ID as
    /// `https://gist.githubusercontent.com/<owner>/<id>/raw/<filename>`.
    /// Falls back to the revision-pinned URL from the response when the
    /// owner is unknown.
    pub fn latest_raw_url(&self, filename: &str) -> Option<String> {
        match self.owner_login() {
            Some(owner) => Some(format!("{}/{}/{}/raw/{}", RAW_HOST, owner, self.id, filename)),
            None => self.files.get(filename).and_then(|f| f.raw_url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CREATED: &str = r#"{
        "id": "aa5a315d61ae9438b18d",
        "html_url": "https://gist.github.com/aa5a315d61ae9438b18d",
        "public": false,
        "created_at": "2024-01-15T10:30:00Z",
        "owner": { "login": "octocat", "id": 1 },
        "files": {
            "diff-1.html": {
                "filename": "diff-1.html",
                "type": "text/html",
                "raw_url": "https://gist.githubusercontent.com/octocat/aa5a315d61ae9438b18d/raw/abc123/diff-1.html",
                "size": 932
            }
        }
    }"#;

    #[test]
    fn test_new_gist_serialization() {
        let gist = NewGist::single_file("desc", Visibility::Private, "a.html", "<p>");
        let json = serde_json::to_value(&gist).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "description": "desc",
                "public": false,
                "files": { "a.html": { "content": "<p>" } }
            })
        );
    }

    #[test]
    fn test_public_visibility() {
        let gist = NewGist::single_file("d", Visibility::Public, "a.html", "");
        assert!(gist.public);
        assert_eq!(Visibility::default(), Visibility::Private);
    }

    #[test]
    fn test_created_gist_deserialization() {
        let gist: CreatedGist = serde_json::from_str(CREATED).unwrap();

        assert_eq!(gist.id, "aa5a315d61ae9438b18d");
        assert_eq!(gist.owner_login(), Some("octocat"));
        assert!(gist.created_at.is_some());
        assert_eq!(
            gist.latest_raw_url("diff-1.html").as_deref(),
            Some("https://gist.githubusercontent.com/octocat/aa5a315d61ae9438b18d/raw/diff-1.html")
        );
    }

    #[test]
    fn test_raw_url_without_owner() {
        let mut gist: CreatedGist = serde_json::from_str(CREATED).unwrap();
        gist.owner = None;

        assert_eq!(
            gist.latest_raw_url("diff-1.html").as_deref(),
            Some("https://gist.githubusercontent.com/octocat/aa5a315d61ae9438b18d/raw/abc123/diff-1.html")
        );
        assert_eq!(gist.latest_raw_url("missing.html"), None);
    }
}
