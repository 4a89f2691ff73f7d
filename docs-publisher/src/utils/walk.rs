use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::read_dir;

use crate::error::AppError;
use crate::storage::paths::relative_key;

/// A regular file found under the site root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteFile {
    pub absolute_path: PathBuf,
    /// `/`-separated path relative to the site root.
    pub relative_path: String,
}

/// Lists every regular file below `root`, sorted by relative path.
/// Symlinks are neither followed nor returned.
pub async fn walk_site_dir(root: &Path) -> Result<Vec<SiteFile>, AppError> {
    let mut files = vec![];
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = read_dir(&dir).await.map_err(|e| AppError::read(&dir, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| AppError::read(&dir, e))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| AppError::read(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let relative = path.strip_prefix(root).map_err(|_| {
                    AppError::read(&path, io::Error::other("path is outside the site root"))
                })?;
                let relative_path = relative_key(relative).ok_or_else(|| {
                    AppError::read(&path, io::Error::other("path is not valid UTF-8"))
                })?;
                files.push(SiteFile {
                    absolute_path: path,
                    relative_path,
                });
            }
        }
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_nested_files_in_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        std::fs::write(dir.path().join("index.html"), "index").unwrap();
        std::fs::write(dir.path().join("sub/page.html"), "page").unwrap();
        std::fs::write(dir.path().join("sub/deeper/a.css"), "css").unwrap();
        std::fs::write(dir.path().join("404.html"), "missing").unwrap();

        let files = walk_site_dir(dir.path()).await.unwrap();
        let relative: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(
            relative,
            vec!["404.html", "index.html", "sub/deeper/a.css", "sub/page.html"]
        );
        assert_eq!(files[1].absolute_path, dir.path().join("index.html"));
    }

    #[tokio::test]
    async fn missing_directory_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = walk_site_dir(&dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, AppError::Read { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "index").unwrap();
        std::os::unix::fs::symlink(dir.path().join("index.html"), dir.path().join("link.html"))
            .unwrap();

        let files = walk_site_dir(dir.path()).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "index.html");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_file_names_are_reported() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"\xff.html")), "bad").unwrap();

        let err = walk_site_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, AppError::Read { .. }));
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
