//! Writing rendered pages into the output directory.

use crate::error::LocalWriteError;
use crate::scheduler::DeletionScheduler;
use crate::utils::browser::Opener;
use crate::utils::chromium::Rasterizer;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use gh_diff_share_config::{DeploymentContext, OutputLocation, OutputMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const HTML_FILENAME: &str = "diff-image.html";
pub const IMAGE_FILENAME: &str = "diff-image.png";

/// Which files a local delivery produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtifactKind {
    #[default]
    Html,
    Image,
    HtmlAndImage,
}

impl ArtifactKind {
    pub fn wants_image(&self) -> bool {
        matches!(self, ArtifactKind::Image | ArtifactKind::HtmlAndImage)
    }
}

impl From<OutputMode> for ArtifactKind {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Html => ArtifactKind::Html,
            OutputMode::Image => ArtifactKind::Image,
            OutputMode::Both => ArtifactKind::HtmlAndImage,
        }
    }
}

/// The page for the browser and, when an image is wanted, the page to rasterize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPages {
    pub screen: String,
    pub image: Option<String>,
}

/// Files written by one local delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    /// Written files, the primary one first
    pub files: Vec<PathBuf>,
    pub opened: bool,
    pub notes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl LocalArtifact {
    pub fn path(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }
}

/// Writes pages under fixed names in the output directory.
///
/// Filenames are reused, so a later delivery overwrites an earlier one.
pub struct LocalArtifactWriter {
    location: OutputLocation,
    deployment: DeploymentContext,
    rasterizer: Arc<dyn Rasterizer>,
    opener: Arc<dyn Opener>,
    scheduler: DeletionScheduler,
    cleanup_after: Option<Duration>,
}

impl LocalArtifactWriter {
    pub fn new(
        location: OutputLocation,
        deployment: DeploymentContext,
        rasterizer: Arc<dyn Rasterizer>,
        opener: Arc<dyn Opener>,
        scheduler: DeletionScheduler,
    ) -> Self {
        Self {
            location,
            deployment,
            rasterizer,
            opener,
            scheduler,
            cleanup_after: None,
        }
    }

    /// Delete written files after `delay`.
    pub fn with_cleanup(mut self, delay: Option<Duration>) -> Self {
        self.cleanup_after = delay;
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.location.dir()
    }

    pub async fn write(
        &self,
        pages: &RenderedPages,
        kind: ArtifactKind,
        auto_open: bool,
    ) -> Result<LocalArtifact, LocalWriteError> {
        let dir = self.location.dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| LocalWriteError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let mut files = Vec::new();
        let mut notes = Vec::new();

        if matches!(kind, ArtifactKind::Html | ArtifactKind::HtmlAndImage) {
            let path = dir.join(HTML_FILENAME);
            tokio::fs::write(&path, &pages.screen)
                .await
                .map_err(|source| LocalWriteError::Write {
                    path: path.clone(),
                    source,
                })?;
            log::info!("Wrote {} ({} bytes)", path.display(), pages.screen.len());
            files.push(path);
        }

        if kind.wants_image() {
            let path = dir.join(IMAGE_FILENAME);
            let page = pages.image.as_deref().unwrap_or(&pages.screen);

            match self.rasterizer.rasterize(page, &path).await {
                Ok(()) => {
                    log::info!("Wrote {}", path.display());
                    files.push(path);
                }
                Err(e) if !files.is_empty() => {
                    log::warn!("Image rendering failed, keeping HTML only: {}", e);
                    notes.push(format!("Image rendering failed: {}", e));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let opened = match files.first() {
            Some(primary) if auto_open => self.open(primary, &mut notes).await,
            _ => false,
        };

        let expires_at = self.schedule_cleanup(&files);

        Ok(LocalArtifact {
            files,
            opened,
            notes,
            expires_at,
        })
    }

    async fn open(&self, path: &Path, notes: &mut Vec<String>) -> bool {
        if self.deployment.is_hosted() {
            notes.push("Auto-open skipped in hosted deployment".to_string());
            return false;
        }

        match self.opener.open(&path.to_string_lossy()).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to open {}: {}", path.display(), e);
                notes.push(format!("Could not open {}: {}", path.display(), e));
                false
            }
        }
    }

    fn schedule_cleanup(&self, files: &[PathBuf]) -> Option<DateTime<Utc>> {
        let delay = self.cleanup_after?;

        for path in files {
            let target = path.clone();
            self.scheduler
                .arm(format!("file:{}", path.display()), delay, async move {
                    match tokio::fs::remove_file(&target).await {
                        Ok(()) => log::info!("Removed {}", target.display()),
                        Err(e) => log::warn!("Failed to remove {}: {}", target.display(), e),
                    }
                });
        }

        ChronoDuration::from_std(delay).ok().map(|d| Utc::now() + d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::browser::tests::RecordingOpener;
    use crate::utils::chromium::tests::{FailingRasterizer, StubRasterizer};
    use pretty_assertions::assert_eq;

    fn pages() -> RenderedPages {
        RenderedPages {
            screen: "<html>screen</html>".to_string(),
            image: Some("<html>image</html>".to_string()),
        }
    }

    fn writer(
        dir: &Path,
        deployment: DeploymentContext,
        rasterizer: Arc<dyn Rasterizer>,
        opener: RecordingOpener,
    ) -> LocalArtifactWriter {
        LocalArtifactWriter::new(
            OutputLocation::Configured(dir.join("out")),
            deployment,
            rasterizer,
            Arc::new(opener),
            DeletionScheduler::new(),
        )
    }

    #[tokio::test]
    async fn test_writes_html_and_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let opener = RecordingOpener::default();
        let w = writer(
            tmp.path(),
            DeploymentContext::Local,
            Arc::new(FailingRasterizer),
            opener.clone(),
        );

        let artifact = w.write(&pages(), ArtifactKind::Html, false).await.unwrap();

        let path = tmp.path().join("out").join(HTML_FILENAME);
        assert_eq!(artifact.files, vec![path.clone()]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>screen</html>");
        assert!(!artifact.opened);
        assert!(opener.opened.lock().unwrap().is_empty());
        assert_eq!(artifact.expires_at, None);
    }

    #[tokio::test]
    async fn test_image_failure_keeps_html() {
        let tmp = tempfile::tempdir().unwrap();
        let w = writer(
            tmp.path(),
            DeploymentContext::Local,
            Arc::new(FailingRasterizer),
            RecordingOpener::default(),
        );

        let artifact = w
            .write(&pages(), ArtifactKind::HtmlAndImage, false)
            .await
            .unwrap();

        assert_eq!(artifact.files.len(), 1);
        assert!(artifact.path().unwrap().ends_with(HTML_FILENAME));
        assert_eq!(artifact.notes.len(), 1);
        assert!(artifact.notes[0].starts_with("Image rendering failed"));
    }

    #[tokio::test]
    async fn test_image_only_failure_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let w = writer(
            tmp.path(),
            DeploymentContext::Local,
            Arc::new(FailingRasterizer),
            RecordingOpener::default(),
        );

        let err = w.write(&pages(), ArtifactKind::Image, false).await.unwrap_err();
        assert!(matches!(err, LocalWriteError::Rasterize(_)));
    }

    #[tokio::test]
    async fn test_both_writes_two_files() {
        let tmp = tempfile::tempdir().unwrap();
        let w = writer(
            tmp.path(),
            DeploymentContext::Local,
            Arc::new(StubRasterizer),
            RecordingOpener::default(),
        );

        let artifact = w
            .write(&pages(), ArtifactKind::HtmlAndImage, false)
            .await
            .unwrap();

        let out = tmp.path().join("out");
        assert_eq!(
            artifact.files,
            vec![out.join(HTML_FILENAME), out.join(IMAGE_FILENAME)]
        );
        assert!(artifact.notes.is_empty());
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let w = writer(
            tmp.path(),
            DeploymentContext::Local,
            Arc::new(FailingRasterizer),
            RecordingOpener::default(),
        );

        w.write(&pages(), ArtifactKind::Html, false).await.unwrap();
        let second = RenderedPages {
            screen: "<html>second</html>".to_string(),
            image: None,
        };
        let artifact = w.write(&second, ArtifactKind::Html, false).await.unwrap();

        let content = std::fs::read_to_string(artifact.path().unwrap()).unwrap();
        assert_eq!(content, "<html>second</html>");
    }

    #[tokio::test]
    async fn test_auto_open() {
        let tmp = tempfile::tempdir().unwrap();
        let opener = RecordingOpener::default();
        let w = writer(
            tmp.path(),
            DeploymentContext::Local,
            Arc::new(FailingRasterizer),
            opener.clone(),
        );

        let artifact = w.write(&pages(), ArtifactKind::Html, true).await.unwrap();

        assert!(artifact.opened);
        let opened = opener.opened.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert!(opened[0].ends_with(HTML_FILENAME));
    }

    #[tokio::test]
    async fn test_open_failure_is_note() {
        let tmp = tempfile::tempdir().unwrap();
        let opener = RecordingOpener {
            fail: true,
            ..RecordingOpener::default()
        };
        let w = writer(
            tmp.path(),
            DeploymentContext::Local,
            Arc::new(FailingRasterizer),
            opener,
        );

        let artifact = w.write(&pages(), ArtifactKind::Html, true).await.unwrap();

        assert!(!artifact.opened);
        assert!(artifact.notes[0].starts_with("Could not open"));
        assert!(artifact.path().unwrap().exists());
    }

    #[tokio::test]
    async fn test_hosted_never_opens() {
        let tmp = tempfile::tempdir().unwrap();
        let opener = RecordingOpener::default();
        let w = writer(
            tmp.path(),
            DeploymentContext::Hosted,
            Arc::new(FailingRasterizer),
            opener.clone(),
        );

        let artifact = w.write(&pages(), ArtifactKind::Html, true).await.unwrap();

        assert!(!artifact.opened);
        assert!(opener.opened.lock().unwrap().is_empty());
        assert_eq!(
            artifact.notes,
            vec!["Auto-open skipped in hosted deployment".to_string()]
        );
    }

    #[tokio::test]
    async fn test_cleanup_removes_files() {
        let tmp = tempfile::tempdir().unwrap();
        let scheduler = DeletionScheduler::new();
        let w = LocalArtifactWriter::new(
            OutputLocation::Configured(tmp.path().to_path_buf()),
            DeploymentContext::Local,
            Arc::new(FailingRasterizer),
            Arc::new(RecordingOpener::default()),
            scheduler.clone(),
        )
        .with_cleanup(Some(Duration::from_millis(1)));

        let artifact = w.write(&pages(), ArtifactKind::Html, false).await.unwrap();
        assert!(artifact.expires_at.is_some());

        scheduler.wait_idle().await;
        assert!(!tmp.path().join(HTML_FILENAME).exists());
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let w = LocalArtifactWriter::new(
            OutputLocation::Configured(blocker.join("out")),
            DeploymentContext::Local,
            Arc::new(FailingRasterizer),
            Arc::new(RecordingOpener::default()),
            DeletionScheduler::new(),
        );

        let err = w.write(&pages(), ArtifactKind::Html, false).await.unwrap_err();
        assert!(matches!(err, LocalWriteError::CreateDir { .. }));
    }

    #[test]
    fn test_kind_from_output_mode() {
        assert_eq!(ArtifactKind::from(OutputMode::Html), ArtifactKind::Html);
        assert_eq!(ArtifactKind::from(OutputMode::Image), ArtifactKind::Image);
        assert_eq!(ArtifactKind::from(OutputMode::Both), ArtifactKind::HtmlAndImage);
    }
}
