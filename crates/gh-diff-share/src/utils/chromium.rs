//! PNG screenshots of HTML pages through a headless Chromium.

use crate::error::RasterizeError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Width of the screenshot and its minimum height, in CSS pixels.
pub const VIEWPORT: (u32, u32) = (1800, 1200);

/// Tallest capture; Chromium refuses larger surfaces on most GPUs.
pub const MAX_HEIGHT: u32 = 16384;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Time Chromium may spend loading the page before dumping its DOM.
const LAYOUT_BUDGET_MS: u32 = 5000;

/// Element the measuring script appends, carrying the document height.
const HEIGHT_MARKER: &str = "gh-diff-share-page-height";

/// Executables tried, in order, when no binary is configured.
const CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

const MACOS_CHROME: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";

/// Turns an HTML page into a PNG file.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, html: &str, target: &Path) -> Result<(), RasterizeError>;
}

/// Rasterizer driving `chromium --headless --screenshot`.
#[derive(Debug, Clone)]
pub struct ChromiumRasterizer {
    binary: Option<PathBuf>,
    timeout: Duration,
}

impl Default for ChromiumRasterizer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ChromiumRasterizer {
    /// `binary` overrides the search on `PATH`.
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self {
            binary,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn locate(&self) -> Result<PathBuf, RasterizeError> {
        if let Some(binary) = &self.binary {
            return Ok(binary.clone());
        }

        let path = std::env::var_os("PATH").unwrap_or_default();
        find_browser(&path).ok_or(RasterizeError::BrowserNotFound)
    }
}

/// First known browser executable in the given `PATH` value.
fn find_browser(path: &std::ffi::OsStr) -> Option<PathBuf> {
    let on_path = CANDIDATES.iter().find_map(|name| {
        std::env::split_paths(path)
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    });

    on_path.or_else(|| {
        let mac = PathBuf::from(MACOS_CHROME);
        (cfg!(target_os = "macos") && mac.is_file()).then_some(mac)
    })
}

/// Page is staged next to the image so relative resources do not matter.
fn staging_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "diff-image".to_string());
    target.with_file_name(format!(".{}.render.html", stem))
}

/// Page with a script that reports the laid out document height.
///
/// The script runs at the end of `<body>` so the height excludes the marker
/// it appends.
fn with_height_marker(html: &str) -> String {
    let script = format!(
        "<script>(function(){{var h=Math.ceil(document.documentElement.scrollHeight);\
         var m=document.createElement('div');m.id='{}';m.textContent=String(h);\
         document.body.appendChild(m);}})();</script>",
        HEIGHT_MARKER
    );

    match html.rfind("</body>") {
        Some(at) => format!("{}{}{}", &html[..at], script, &html[at..]),
        None => format!("{}{}", html, script),
    }
}

/// Height reported by [`with_height_marker`] in a dumped DOM.
fn parse_page_height(dom: &str) -> Option<u32> {
    let open = format!("id=\"{}\">", HEIGHT_MARKER);
    let start = dom.find(&open)? + open.len();
    let rest = &dom[start..];
    let end = rest.find('<')?;
    rest[..end].trim().parse().ok()
}

/// Capture height for a document of `height` pixels.
fn capture_height(height: Option<u32>) -> u32 {
    height.unwrap_or(VIEWPORT.1).clamp(VIEWPORT.1, MAX_HEIGHT)
}

#[async_trait]
impl Rasterizer for ChromiumRasterizer {
    async fn rasterize(&self, html: &str, target: &Path) -> Result<(), RasterizeError> {
        let binary = self.locate()?;
        let staged = staging_path(target);

        let result = self.rasterize_staged(&binary, html, &staged, target).await;

        if let Err(e) = tokio::fs::remove_file(&staged).await {
            log::debug!("Failed to remove {}: {}", staged.display(), e);
        }

        result
    }
}

impl ChromiumRasterizer {
    async fn rasterize_staged(
        &self,
        binary: &Path,
        html: &str,
        staged: &Path,
        target: &Path,
    ) -> Result<(), RasterizeError> {
        tokio::fs::write(staged, with_height_marker(html))
            .await
            .map_err(RasterizeError::Stage)?;
        let page = std::path::absolute(staged).map_err(RasterizeError::Stage)?;

        let height = match self.measure(binary, &page).await {
            Ok(height) => capture_height(height),
            Err(e) => {
                log::debug!("Could not measure {}: {}", page.display(), e);
                VIEWPORT.1
            }
        };

        tokio::fs::write(staged, html)
            .await
            .map_err(RasterizeError::Stage)?;
        self.screenshot(binary, &page, target, height).await
    }

    /// Document height of the staged page, laid out at the capture width.
    async fn measure(&self, binary: &Path, page: &Path) -> Result<Option<u32>, RasterizeError> {
        let (width, height) = VIEWPORT;
        let dom = self
            .run(
                binary,
                vec![
                    format!("--window-size={},{}", width, height),
                    format!("--virtual-time-budget={}", LAYOUT_BUDGET_MS),
                    "--dump-dom".to_string(),
                    format!("file://{}", page.display()),
                ],
            )
            .await?;

        let measured = parse_page_height(&String::from_utf8_lossy(&dom));
        log::debug!("Measured {} at {:?} px", page.display(), measured);
        Ok(measured)
    }

    async fn screenshot(
        &self,
        binary: &Path,
        page: &Path,
        target: &Path,
        height: u32,
    ) -> Result<(), RasterizeError> {
        log::debug!(
            "Rasterizing {} at {}x{} with {}",
            page.display(),
            VIEWPORT.0,
            height,
            binary.display()
        );

        self.run(
            binary,
            vec![
                format!("--window-size={},{}", VIEWPORT.0, height),
                format!("--screenshot={}", target.display()),
                format!("file://{}", page.display()),
            ],
        )
        .await?;

        if !tokio::fs::try_exists(target).await.unwrap_or(false) {
            return Err(RasterizeError::NoOutput(target.to_path_buf()));
        }

        Ok(())
    }

    /// Runs one headless browser invocation and returns its stdout.
    async fn run(&self, binary: &Path, args: Vec<String>) -> Result<Vec<u8>, RasterizeError> {
        let child = Command::new(binary)
            .args(["--headless", "--disable-gpu", "--hide-scrollbars"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RasterizeError::Launch {
                binary: binary.to_path_buf(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(RasterizeError::Launch {
                    binary: binary.to_path_buf(),
                    source,
                })
            }
            Err(_) => return Err(RasterizeError::TimedOut(self.timeout)),
        };

        if !output.status.success() {
            return Err(RasterizeError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Always fails, as a machine without a browser does.
    pub(crate) struct FailingRasterizer;

    #[async_trait]
    impl Rasterizer for FailingRasterizer {
        async fn rasterize(&self, _html: &str, _target: &Path) -> Result<(), RasterizeError> {
            Err(RasterizeError::BrowserNotFound)
        }
    }

    /// Writes a fake PNG header to the target.
    pub(crate) struct StubRasterizer;

    #[async_trait]
    impl Rasterizer for StubRasterizer {
        async fn rasterize(&self, _html: &str, target: &Path) -> Result<(), RasterizeError> {
            tokio::fs::write(target, b"\x89PNG\r\n\x1a\n")
                .await
                .map_err(RasterizeError::Stage)
        }
    }

    #[test]
    fn test_find_browser_on_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("google-chrome"), "").unwrap();

        let found = find_browser(dir.path().as_os_str());
        assert_eq!(found, Some(dir.path().join("google-chrome")));
    }

    #[test]
    fn test_find_browser_prefers_chromium() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("google-chrome"), "").unwrap();
        std::fs::write(dir.path().join("chromium"), "").unwrap();

        let found = find_browser(dir.path().as_os_str());
        assert_eq!(found, Some(dir.path().join("chromium")));
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("/out/diff-image.png")),
            PathBuf::from("/out/.diff-image.render.html")
        );
    }

    #[test]
    fn test_height_marker_goes_inside_body() {
        let page = with_height_marker("<html><body><p>x</p></body></html>");
        let at = page.find("<script>").unwrap();
        assert!(page[..at].ends_with("<p>x</p>"));
        assert!(page.ends_with("</script></body></html>"));
        assert!(page.contains("scrollHeight"));
    }

    #[test]
    fn test_height_marker_without_body() {
        let page = with_height_marker("<p>x</p>");
        assert!(page.starts_with("<p>x</p><script>"));
    }

    #[test]
    fn test_parse_page_height() {
        let dom = format!(
            "<html><body><p>x</p><script>m.id='{0}'</script><div id=\"{0}\">4821</div></body></html>",
            HEIGHT_MARKER
        );
        assert_eq!(parse_page_height(&dom), Some(4821));
        assert_eq!(parse_page_height("<html><body></body></html>"), None);
        assert_eq!(
            parse_page_height(&format!("<div id=\"{}\">tall</div>", HEIGHT_MARKER)),
            None
        );
    }

    #[test]
    fn test_capture_height_is_clamped() {
        assert_eq!(capture_height(Some(4821)), 4821);
        assert_eq!(capture_height(Some(300)), VIEWPORT.1);
        assert_eq!(capture_height(Some(90_000)), MAX_HEIGHT);
        assert_eq!(capture_height(None), VIEWPORT.1);
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer =
            ChromiumRasterizer::new(Some(PathBuf::from("/nonexistent/gh-diff-share-chromium")));

        let err = rasterizer
            .rasterize("<html></html>", &dir.path().join("diff-image.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, RasterizeError::Launch { .. }));
        assert!(!dir.path().join(".diff-image.render.html").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_browser_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = ChromiumRasterizer::new(Some(PathBuf::from("false")));

        let err = rasterizer
            .rasterize("<html></html>", &dir.path().join("diff-image.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, RasterizeError::Failed { .. }));
    }

    /// Shell script standing in for Chromium: reports a 3000px page and
    /// records the screenshot arguments next to the image.
    #[cfg(unix)]
    fn fake_browser(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-chromium");
        std::fs::write(
            &script,
            format!(
                r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    --dump-dom) echo '<html><body><div id="{}">3000</div></body></html>' ;;
    --screenshot=*)
      out="${{arg#--screenshot=}}"
      printf '%s\n' "$@" > "$out.args"
      printf 'PNG' > "$out" ;;
  esac
done
"#,
                HEIGHT_MARKER
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_screenshot_covers_whole_page() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = ChromiumRasterizer::new(Some(fake_browser(dir.path())));
        let target = dir.path().join("diff-image.png");

        rasterizer
            .rasterize("<html><body><p>x</p></body></html>", &target)
            .await
            .unwrap();

        assert!(target.exists());
        let args = std::fs::read_to_string(dir.path().join("diff-image.png.args")).unwrap();
        assert!(args.lines().any(|a| a == "--window-size=1800,3000"));
        assert!(!dir.path().join(".diff-image.render.html").exists());
    }
}
