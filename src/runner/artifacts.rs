//! Files a run leaves behind: screenshots and the JSON report.

use super::SuiteResult;
use crate::session::Session;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub(super) fn screenshot_name(project: &str) -> String {
    format!("screenshot-{}.png", project)
}

/// Expand `{project}` and `{timestamp}` in a failure screenshot template.
pub(super) fn failure_screenshot_path(template: &str, project: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    PathBuf::from(
        template
            .replace("{project}", project)
            .replace("{timestamp}", &timestamp),
    )
}

/// Capture the page to `path`. Failures are logged, not returned.
pub(super) async fn save_screenshot<S: Session>(session: &S, path: &Path) -> Option<PathBuf> {
    let data = match session.screenshot().await {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to capture screenshot: {}", e);
            return None;
        }
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("Failed to create {}: {}", dir.display(), e);
            return None;
        }
    }
    match std::fs::write(path, data) {
        Ok(()) => {
            info!("Saved screenshot to: {}", path.display());
            Some(path.to_path_buf())
        }
        Err(e) => {
            warn!("Failed to save screenshot: {}", e);
            None
        }
    }
}

pub(super) fn write_report(path: &Path, result: &SuiteResult) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::FakeSession;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "storefront-e2e-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn screenshot_is_named_by_project() {
        assert_eq!(screenshot_name("FR"), "screenshot-FR.png");
    }

    #[test]
    fn failure_template_expands_placeholders() {
        let path = failure_screenshot_path("failures/{project}-{timestamp}.png", "ES");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ES-"), "{name}");
        assert!(!name.contains('{'));
        assert_eq!(path.parent().unwrap(), Path::new("failures"));
    }

    #[tokio::test]
    async fn saves_screenshot_creating_directories() {
        let dir = scratch_dir("shots");
        let path = dir.join("nested").join(screenshot_name("FR"));
        let session = FakeSession::new();

        let saved = save_screenshot(&session, &path).await;
        assert_eq!(saved.as_deref(), Some(path.as_path()));
        assert_eq!(&std::fs::read(&path).unwrap()[1..4], b"PNG");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn writes_json_report() {
        let dir = scratch_dir("report");
        let path = dir.join("report.json");
        let result = SuiteResult {
            name: "Check payment".into(),
            duration_ms: 5,
            projects: Vec::new(),
        };

        write_report(&path, &result).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["name"], "Check payment");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
