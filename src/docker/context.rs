//! Docker build context preparation.
//!
//! The context directory is synchronized, not merged: it is recreated on
//! every run so files dropped from the declared set don't linger in later
//! images.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, TagshipError};

/// Materialize the build context.
///
/// Copies `dockerfile` to `<context_dir>/Dockerfile` and every file matched
/// by the glob `patterns` (relative to `project_dir`, directories copied
/// recursively) to the same relative location below `context_dir`.
///
/// # Returns
/// * `Ok(files)` - Context-relative paths of all copied files, sorted
/// * `Err` - If the Dockerfile is missing, a pattern is invalid, or the
///   context directory would overlap the project directory
pub fn prepare_context(
    project_dir: &Path,
    dockerfile: &Path,
    patterns: &[String],
    context_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let project_dir = absolute(project_dir);
    let context_dir = absolute(&project_dir.join(context_dir));
    let dockerfile = project_dir.join(dockerfile);

    if project_dir.starts_with(&context_dir) {
        return Err(TagshipError::build_config(format!(
            "context directory {} must not contain the project directory",
            context_dir.display()
        )));
    }
    if !dockerfile.is_file() {
        return Err(TagshipError::build_config(format!(
            "Dockerfile not found at {}",
            dockerfile.display()
        )));
    }

    if context_dir.exists() {
        fs::remove_dir_all(&context_dir)?;
    }
    fs::create_dir_all(&context_dir)?;

    let mut copied = vec![PathBuf::from("Dockerfile")];
    fs::copy(&dockerfile, context_dir.join("Dockerfile"))?;

    for pattern in patterns {
        let full = project_dir.join(pattern);
        let full = full.to_string_lossy();
        let matches = glob::glob(&full)
            .map_err(|e| TagshipError::build_config(format!("invalid file pattern '{}': {}", pattern, e)))?;

        let mut matched_any = false;
        for entry in matches {
            let path = entry.map_err(|e| TagshipError::Io(e.into()))?;
            if path.starts_with(&context_dir) {
                continue;
            }
            matched_any = true;
            for file in files_below(&path, &context_dir) {
                let rel = relative_to(&file, &project_dir);
                let dest = context_dir.join(&rel);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&file, &dest)?;
                copied.push(rel);
            }
        }
        if !matched_any {
            log::warn!("Docker file pattern '{}' matched nothing", pattern);
        }
    }

    copied.sort();
    copied.dedup();
    log::info!(
        "Prepared docker context {} with {} files",
        context_dir.display(),
        copied.len()
    );
    Ok(copied)
}

/// Files at or below `path`, never descending into `exclude`
fn files_below(path: &Path, exclude: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| !e.path().starts_with(exclude))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    match path.strip_prefix(base) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf()),
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Dockerfile"), "FROM alpine\n").unwrap();
        fs::write(tmp.path().join("VERSION.txt"), "0.0.2").unwrap();
        fs::create_dir_all(tmp.path().join("dist/lib")).unwrap();
        fs::write(tmp.path().join("dist/app.whl"), "wheel").unwrap();
        fs::write(tmp.path().join("dist/lib/dep.so"), "so").unwrap();
        tmp
    }

    #[test]
    fn test_prepare_context_copies_declared_files() {
        let tmp = project();
        let files = prepare_context(
            tmp.path(),
            Path::new("Dockerfile"),
            &["VERSION.txt".to_string(), "dist".to_string()],
            Path::new("build/docker"),
        )
        .unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("Dockerfile"),
                PathBuf::from("VERSION.txt"),
                PathBuf::from("dist/app.whl"),
                PathBuf::from("dist/lib/dep.so"),
            ]
        );
        let ctx = tmp.path().join("build/docker");
        assert_eq!(fs::read_to_string(ctx.join("Dockerfile")).unwrap(), "FROM alpine\n");
        assert!(ctx.join("dist/lib/dep.so").is_file());
    }

    #[test]
    fn test_prepare_context_removes_stale_files() {
        let tmp = project();
        let ctx = tmp.path().join("build/docker");
        fs::create_dir_all(&ctx).unwrap();
        fs::write(ctx.join("stale.txt"), "old").unwrap();

        prepare_context(tmp.path(), Path::new("Dockerfile"), &[], Path::new("build/docker"))
            .unwrap();
        assert!(!ctx.join("stale.txt").exists());
        assert!(ctx.join("Dockerfile").is_file());
    }

    #[test]
    fn test_prepare_context_glob_pattern() {
        let tmp = project();
        let files = prepare_context(
            tmp.path(),
            Path::new("Dockerfile"),
            &["dist/*.whl".to_string()],
            Path::new("build/docker"),
        )
        .unwrap();
        assert!(files.contains(&PathBuf::from("dist/app.whl")));
        assert!(!files.contains(&PathBuf::from("dist/lib/dep.so")));
    }

    #[test]
    fn test_prepare_context_skips_itself_in_parent_pattern() {
        let tmp = project();
        fs::create_dir_all(tmp.path().join("build/wheels")).unwrap();
        fs::write(tmp.path().join("build/wheels/app.whl"), "wheel").unwrap();

        for _ in 0..2 {
            let files = prepare_context(
                tmp.path(),
                Path::new("Dockerfile"),
                &["build".to_string()],
                Path::new("build/docker"),
            )
            .unwrap();
            assert_eq!(
                files,
                vec![PathBuf::from("Dockerfile"), PathBuf::from("build/wheels/app.whl")]
            );
        }
        assert!(!tmp.path().join("build/docker/build/docker").exists());
    }

    #[test]
    fn test_prepare_context_missing_dockerfile() {
        let tmp = TempDir::new().unwrap();
        let err = prepare_context(tmp.path(), Path::new("Dockerfile"), &[], Path::new("ctx"))
            .unwrap_err();
        assert!(matches!(err, TagshipError::InvalidBuildConfig(_)));
    }

    #[test]
    fn test_prepare_context_refuses_project_dir() {
        let tmp = project();
        let err = prepare_context(tmp.path(), Path::new("Dockerfile"), &[], Path::new("."))
            .unwrap_err();
        assert!(matches!(err, TagshipError::InvalidBuildConfig(_)));
        assert!(tmp.path().join("Dockerfile").is_file());
    }
}
