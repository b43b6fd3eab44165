//! Turning caller-supplied paths into scan targets.

use std::path::Path;

use scangate_config::{LimitsConfig, PathMapping};
use scangate_model::{FileTarget, ScanResult};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into while collecting project files.
pub const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "vendor",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "venv",
];

/// Read `path` as UTF-8 when it is a regular file no larger than `max_bytes`.
pub fn read_target(path: &Path, max_bytes: u64) -> Option<String> {
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_file() || metadata.len() > max_bytes {
        return None;
    }
    std::fs::read_to_string(path).ok()
}

/// Walk `root` in file-name order and load every readable text file.
///
/// Binary, oversized and unreadable files are skipped. Collection stops at
/// `limits.max_files`.
pub fn collect_files(root: &Path, limits: &LimitsConfig) -> Vec<FileTarget> {
    let mut targets = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if targets.len() >= limits.max_files {
            warn!(
                root = %root.display(),
                max_files = limits.max_files,
                "file limit reached, remaining files not scanned"
            );
            break;
        }
        if let Some(content) = read_target(entry.path(), limits.max_file_bytes) {
            targets.push(FileTarget::with_content(
                entry.path().to_string_lossy(),
                content,
            ));
        }
    }

    debug!(root = %root.display(), files = targets.len(), "collected project files");
    targets
}

/// Rewrite finding locations from the gateway mount back to the caller's root.
pub fn to_caller_view(mut result: ScanResult, paths: &PathMapping) -> ScanResult {
    if !paths.is_identity() {
        for finding in &mut result.findings {
            finding.file = paths.to_caller(&finding.file);
        }
    }
    result
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn limits(max_file_bytes: u64, max_files: usize) -> LimitsConfig {
        LimitsConfig {
            max_body_bytes: 1024,
            max_file_bytes,
            max_files,
        }
    }

    fn project() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).expect("src");
        std::fs::create_dir_all(root.join("node_modules/pkg")).expect("node_modules");
        std::fs::write(root.join("src/app.js"), "eval(input)").expect("app.js");
        std::fs::write(root.join("src/util.js"), "module.exports = {}").expect("util.js");
        std::fs::write(root.join("node_modules/pkg/index.js"), "x").expect("dep");
        std::fs::write(root.join("blob.bin"), [0xff, 0xfe, 0x00, 0x80]).expect("bin");
        dir
    }

    #[test]
    fn collects_text_files_and_skips_vendor_dirs() {
        let dir = project();
        let files = collect_files(dir.path(), &limits(1024, 100));

        let names: Vec<String> = files
            .iter()
            .map(|f| {
                Path::new(&f.path)
                    .strip_prefix(dir.path())
                    .expect("under root")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, vec!["src/app.js", "src/util.js"]);
        assert_eq!(files[0].content.as_deref(), Some("eval(input)"));
    }

    #[test]
    fn honours_size_and_count_limits() {
        let dir = project();
        assert_eq!(collect_files(dir.path(), &limits(1024, 1)).len(), 1);

        let small = collect_files(dir.path(), &limits(12, 100));
        assert_eq!(small.len(), 1);
        assert!(small[0].path.ends_with("app.js"));
    }

    #[test]
    fn caller_view_rewrites_finding_paths() {
        let mut result = ScanResult::empty("scangate");
        let mut finding: scangate_model::Finding = serde_json::from_value(serde_json::json!({
            "id": "SAST-1",
            "severity": "high",
            "title": "Eval",
            "description": "eval of input",
            "file": "/workspace/src/app.js",
            "remediation": "Avoid eval"
        }))
        .expect("finding");
        result.findings.push(finding.clone());

        let mapped = to_caller_view(result, &PathMapping::new("/home/dev/app", "/workspace"));
        finding.file = "/home/dev/app/src/app.js".into();
        assert_eq!(mapped.findings, vec![finding]);
    }

    #[test]
    fn read_target_rejects_directories_and_missing_files() {
        let dir = project();
        assert!(read_target(dir.path(), 1024).is_none());
        assert!(read_target(&dir.path().join("missing.js"), 1024).is_none());
        assert_eq!(
            read_target(&dir.path().join("src/app.js"), 1024).as_deref(),
            Some("eval(input)")
        );
    }
}
