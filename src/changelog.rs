//! Changelog parsing - extracts the latest release entry.
//!
//! Two dialects are supported:
//!
//! - Markdown (`.md`): every release starts with a `## ` heading of the form
//!   `## 2018-01-15 / 0.0.2`, or `## unreleased`.
//! - Underline (`.rst`, `.txt`): a `===` banner encloses the document title,
//!   the line above the third `===` marker is the latest release
//!   (`2018/01/15 0.0.2` or `unreleased`).
//!
//! Only the first entry is inspected. If it is not a well-formed release
//! line the document is rejected rather than skipped over.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::version::{SemanticVersion, RELEASE_VERSION_PATTERN};
use crate::error::{Result, TagshipError};

/// Conventional changelog base names, searched in order.
pub const CHANGELOG_BASE_NAMES: [&str; 2] = ["CHANGES", "CHANGELOG"];

/// Recognized changelog extensions, searched in order for each base name.
pub const CHANGELOG_EXTENSIONS: [&str; 3] = ["md", "rst", "txt"];

static MD_RELEASE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^##\s([0-9]{{4}}-[0-9]{{2}}-[0-9]{{2}})\s/\s({})$",
        RELEASE_VERSION_PATTERN
    ))
    .expect("valid markdown release regex")
});

static UNDERLINE_RELEASE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^([0-9]{{4}}/[0-9]{{2}}/[0-9]{{2}})\s({})$",
        RELEASE_VERSION_PATTERN
    ))
    .expect("valid underline release regex")
});

static UNDERLINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^={3,}\s*$").expect("valid underline marker regex"));

/// The most recent released entry of a changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    /// Release date exactly as written in the changelog
    pub date: String,
    pub version: SemanticVersion,
}

/// Changelog dialect, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangelogFormat {
    Markdown,
    Underline,
}

impl ChangelogFormat {
    /// Select the dialect for a changelog file
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") => Ok(ChangelogFormat::Markdown),
            Some("rst") | Some("txt") => Ok(ChangelogFormat::Underline),
            _ => Err(TagshipError::UnsupportedChangelogFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn date_format(self) -> &'static str {
        match self {
            ChangelogFormat::Markdown => "%Y-%m-%d",
            ChangelogFormat::Underline => "%Y/%m/%d",
        }
    }

    /// Extract the latest entry from changelog contents.
    ///
    /// `path` is only used for error messages. Returns `Ok(None)` if the
    /// latest entry is unreleased.
    pub fn parse_latest(self, path: &Path, contents: &str) -> Result<Option<ReleaseEntry>> {
        match self {
            ChangelogFormat::Markdown => self.parse_markdown(path, contents),
            ChangelogFormat::Underline => self.parse_underline(path, contents),
        }
    }

    fn parse_markdown(self, path: &Path, contents: &str) -> Result<Option<ReleaseEntry>> {
        let heading = contents
            .lines()
            .find(|l| l.starts_with("## "))
            .ok_or_else(|| TagshipError::malformed_changelog(path, "no release line found"))?;

        let rel = heading.trim();
        if rel == "## unreleased" {
            return Ok(None);
        }
        self.release_entry(path, rel, &MD_RELEASE_LINE).map(Some)
    }

    fn parse_underline(self, path: &Path, contents: &str) -> Result<Option<ReleaseEntry>> {
        let mut markers = 0;
        let mut previous = "";

        for line in contents.lines() {
            if UNDERLINE_MARKER.is_match(line) {
                markers += 1;
                if markers == 3 {
                    let rel = previous.trim();
                    if rel == "unreleased" {
                        return Ok(None);
                    }
                    return self
                        .release_entry(path, rel, &UNDERLINE_RELEASE_LINE)
                        .map(Some);
                }
            }
            previous = line;
        }

        Err(TagshipError::malformed_changelog(
            path,
            "no release line found",
        ))
    }

    fn release_entry(self, path: &Path, line: &str, pattern: &Regex) -> Result<ReleaseEntry> {
        let caps = pattern.captures(line).ok_or_else(|| {
            TagshipError::malformed_changelog(
                path,
                format!("release line not found in first heading: '{}'", line),
            )
        })?;

        let date = &caps[1];
        NaiveDate::parse_from_str(date, self.date_format()).map_err(|e| {
            TagshipError::malformed_changelog(path, format!("invalid release date '{}': {}", date, e))
        })?;

        Ok(ReleaseEntry {
            date: date.to_string(),
            version: SemanticVersion::parse(&caps[2])?,
        })
    }
}

/// A located changelog file and its dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    path: PathBuf,
    format: ChangelogFormat,
}

impl Changelog {
    /// Locate a changelog.
    ///
    /// If `path` is a directory, the conventional names are searched in
    /// order and the first existing file wins. Otherwise `path` is used
    /// as-is and its extension picks the dialect.
    pub fn locate(path: &Path) -> Result<Self> {
        let file = if path.is_dir() {
            candidate_names()
                .into_iter()
                .map(|name| path.join(name))
                .find(|candidate| candidate.is_file())
                .ok_or_else(|| TagshipError::ChangelogNotFound {
                    dir: path.to_path_buf(),
                    candidates: candidate_names(),
                })?
        } else {
            path.to_path_buf()
        };

        let format = ChangelogFormat::from_path(&file)?;
        log::debug!("Using {:?} changelog {}", format, file.display());
        Ok(Changelog { path: file, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ChangelogFormat {
        self.format
    }

    /// Read the latest release entry, `None` if it is unreleased.
    pub fn latest_version(&self) -> Result<Option<ReleaseEntry>> {
        let contents = fs::read_to_string(&self.path)?;
        self.format.parse_latest(&self.path, &contents)
    }
}

/// All conventional changelog file names in search order
pub fn candidate_names() -> Vec<String> {
    CHANGELOG_BASE_NAMES
        .iter()
        .flat_map(|base| {
            CHANGELOG_EXTENSIONS
                .iter()
                .map(move |ext| format!("{}.{}", base, ext))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNRELEASED_RST: &str = "\
=============================
Changes for some cool project
=============================

unreleased
==========

 - use generic database schema

2018/01/15 0.0.1
================

 - initial version
";

    const RELEASED_RST: &str = "\
=============================
Changes for some cool project
=============================

2018/01/15 0.0.2
================

 - the change in 0.0.2

2017/01/15 0.0.1
================

 - initial version
";

    const RELEASED_RST_WITH_REVISION: &str = "\
=============================
Changes for some cool project
=============================

2018/01/15 0.0.2-10
===================

 - the revision
";

    const UNRELEASED_MD: &str = "\
# Changes for some cool project

## unreleased

 - use generic database schema

## 2018-01-15 / 0.0.1

 - initial version
";

    const RELEASED_MD: &str = "\
# Changes for some cool project

## 2018-01-15 / 0.0.2

 - the change in 0.0.2

## 2017-01-15 0.0.1

 - initial version
";

    fn latest(format: ChangelogFormat, contents: &str) -> Result<Option<ReleaseEntry>> {
        format.parse_latest(Path::new("CHANGES"), contents)
    }

    #[test]
    fn test_underline_unreleased() {
        assert_eq!(latest(ChangelogFormat::Underline, UNRELEASED_RST).unwrap(), None);
    }

    #[test]
    fn test_underline_released() {
        let entry = latest(ChangelogFormat::Underline, RELEASED_RST)
            .unwrap()
            .unwrap();
        assert_eq!(entry.version.to_string(), "0.0.2");
        assert_eq!(entry.date, "2018/01/15");
    }

    #[test]
    fn test_underline_released_with_revision() {
        let entry = latest(ChangelogFormat::Underline, RELEASED_RST_WITH_REVISION)
            .unwrap()
            .unwrap();
        assert_eq!(entry.version, SemanticVersion::with_revision(0, 0, 2, 10));
        assert_eq!(entry.date, "2018/01/15");
    }

    #[test]
    fn test_underline_missing_release_line() {
        let contents = "=====\nTitle\n=====\n\nsome text\n";
        let err = latest(ChangelogFormat::Underline, contents).unwrap_err();
        assert!(matches!(err, TagshipError::MalformedChangelog { .. }));
        assert!(err.to_string().contains("no release line found"));
    }

    #[test]
    fn test_underline_garbage_release_line() {
        let contents = "=====\nTitle\n=====\n\nnext version\n============\n";
        let err = latest(ChangelogFormat::Underline, contents).unwrap_err();
        assert!(matches!(err, TagshipError::MalformedChangelog { .. }));
    }

    #[test]
    fn test_underline_invalid_calendar_date() {
        let contents = "=====\nTitle\n=====\n\n2018/02/30 0.0.1\n================\n";
        assert!(latest(ChangelogFormat::Underline, contents).is_err());
    }

    #[test]
    fn test_markdown_unreleased() {
        assert_eq!(latest(ChangelogFormat::Markdown, UNRELEASED_MD).unwrap(), None);
    }

    #[test]
    fn test_markdown_released() {
        let entry = latest(ChangelogFormat::Markdown, RELEASED_MD).unwrap().unwrap();
        assert_eq!(entry.date, "2018-01-15");
        assert_eq!(entry.version, SemanticVersion::new(0, 0, 2));
    }

    #[test]
    fn test_markdown_first_heading_is_fatal() {
        let contents = "# Title\n\n## 2017-01-15 0.0.1\n\n## 2016-01-15 / 0.0.0\n";
        let err = latest(ChangelogFormat::Markdown, contents).unwrap_err();
        assert!(err.to_string().contains("release line not found in first heading"));
    }

    #[test]
    fn test_markdown_unreleased_is_case_sensitive() {
        let contents = "## Unreleased\n";
        assert!(latest(ChangelogFormat::Markdown, contents).is_err());
    }

    #[test]
    fn test_markdown_indented_heading_is_not_a_release() {
        let contents = "# Title\n\n  ## 2018-01-15 / 0.0.2\n";
        let err = latest(ChangelogFormat::Markdown, contents).unwrap_err();
        assert!(err.to_string().contains("no release line found"));
    }

    #[test]
    fn test_markdown_no_heading() {
        let err = latest(ChangelogFormat::Markdown, "# Title\n\nnothing here\n").unwrap_err();
        assert!(err.to_string().contains("no release line found"));
    }

    #[test]
    fn test_markdown_invalid_calendar_date() {
        let contents = "## 2018-13-01 / 0.0.1\n";
        assert!(latest(ChangelogFormat::Markdown, contents).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ChangelogFormat::from_path(Path::new("CHANGES.md")).unwrap(),
            ChangelogFormat::Markdown
        );
        assert_eq!(
            ChangelogFormat::from_path(Path::new("CHANGES.txt")).unwrap(),
            ChangelogFormat::Underline
        );
        assert!(matches!(
            ChangelogFormat::from_path(Path::new("CHANGES.adoc")),
            Err(TagshipError::UnsupportedChangelogFormat { .. })
        ));
    }

    #[test]
    fn test_locate_in_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("CHANGES.rst"), RELEASED_RST).unwrap();
        fs::write(tmp.path().join("CHANGELOG.md"), RELEASED_MD).unwrap();

        let changelog = Changelog::locate(tmp.path()).unwrap();
        assert_eq!(changelog.path(), tmp.path().join("CHANGES.rst"));
        assert_eq!(changelog.format(), ChangelogFormat::Underline);
        let entry = changelog.latest_version().unwrap().unwrap();
        assert_eq!(entry.version.to_string(), "0.0.2");
    }

    #[test]
    fn test_locate_not_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("NEWS.md"), RELEASED_MD).unwrap();
        let err = Changelog::locate(tmp.path()).unwrap_err();
        assert!(matches!(err, TagshipError::ChangelogNotFound { .. }));
    }

    #[test]
    fn test_candidate_order() {
        let names = candidate_names();
        assert_eq!(names.first().map(String::as_str), Some("CHANGES.md"));
        assert_eq!(names.last().map(String::as_str), Some("CHANGELOG.txt"));
        assert_eq!(names.len(), 6);
    }
}
