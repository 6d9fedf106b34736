//! Copying distributables into the staging folder.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::patterns::ExcludePatterns;

/// Result of copying a directory tree.
#[derive(Debug, Clone, Default)]
pub struct CopySummary {
    /// Copied files, relative to the destination root.
    pub copied: Vec<PathBuf>,
    /// Excluded files or directories, relative to the source root.
    pub skipped: Vec<PathBuf>,
}

/// Recursively copy `src` into `dst`, skipping entries whose file name
/// matches `exclude`. Entries are visited in name order.
pub fn copy_tree(src: &Path, dst: &Path, exclude: &ExcludePatterns) -> io::Result<CopySummary> {
    let mut summary = CopySummary::default();
    fs::create_dir_all(dst)?;
    copy_dir_inner(src, dst, Path::new(""), exclude, &mut summary)?;
    Ok(summary)
}

fn copy_dir_inner(
    src: &Path,
    dst: &Path,
    rel: &Path,
    exclude: &ExcludePatterns,
    summary: &mut CopySummary,
) -> io::Result<()> {
    for entry in sorted_entries(src)? {
        let name = entry.file_name();
        let rel_path = rel.join(&name);

        if exclude.matches_name(&name.to_string_lossy()) {
            summary.skipped.push(rel_path);
            continue;
        }

        let from = entry.path();
        let to = dst.join(&name);
        if fs::metadata(&from)?.is_dir() {
            fs::create_dir_all(&to)?;
            copy_dir_inner(&from, &to, &rel_path, exclude, summary)?;
        } else {
            fs::copy(&from, &to)?;
            summary.copied.push(rel_path);
        }
    }
    Ok(())
}

/// Directory entries sorted by file name.
pub fn sorted_entries(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Every file below `root`, relative to it, in name order.
pub fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    list_files_inner(root, Path::new(""), &mut files)?;
    Ok(files)
}

fn list_files_inner(dir: &Path, rel: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in sorted_entries(dir)? {
        let rel_path = rel.join(entry.file_name());
        if fs::metadata(entry.path())?.is_dir() {
            list_files_inner(&entry.path(), &rel_path, files)?;
        } else {
            files.push(rel_path);
        }
    }
    Ok(())
}

/// A staging folder must be a plain relative path below the root.
///
/// The folder is deleted at the start of every build, so `""`, `.`,
/// `..`, absolute paths and parent hops are rejected.
pub fn is_safe_relative_dir(folder: &str) -> bool {
    let mut has_normal = false;
    for component in Path::new(folder).components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            _ => return false,
        }
    }
    has_normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn patterns() -> ExcludePatterns {
        ExcludePatterns::new(["__pycache__", "*.pyc"]).unwrap()
    }

    #[test]
    fn copies_tree_without_caches() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("rqm");
        fs::create_dir_all(src.join("__pycache__")).unwrap();
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("jobs.py"), "x = 1").unwrap();
        fs::write(src.join("stale.pyc"), [0u8; 4]).unwrap();
        fs::write(src.join("__pycache__").join("jobs.cpython-311.pyc"), [0u8; 4]).unwrap();
        fs::write(src.join("sub").join("ui.py"), "y = 2").unwrap();

        let dst = dir.path().join("out").join("rqm");
        let summary = copy_tree(&src, &dst, &patterns()).unwrap();

        assert_eq!(
            summary.copied,
            vec![PathBuf::from("jobs.py"), PathBuf::from("sub").join("ui.py")]
        );
        assert_eq!(
            summary.skipped,
            vec![PathBuf::from("__pycache__"), PathBuf::from("stale.pyc")]
        );
        assert!(!dst.join("__pycache__").exists());
        assert_eq!(fs::read_to_string(dst.join("sub").join("ui.py")).unwrap(), "y = 2");
    }

    #[test]
    fn list_files_is_sorted_and_recursive() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("b").join("inner.txt"), "").unwrap();

        let files = list_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b").join("inner.txt"),
                PathBuf::from("c.txt"),
            ]
        );
    }

    #[test]
    fn staging_folder_must_stay_below_root() {
        assert!(is_safe_relative_dir("dist"));
        assert!(is_safe_relative_dir("build/dist"));
        assert!(is_safe_relative_dir("./dist"));
        assert!(!is_safe_relative_dir(""));
        assert!(!is_safe_relative_dir("."));
        assert!(!is_safe_relative_dir(".."));
        assert!(!is_safe_relative_dir("dist/../.."));
        assert!(!is_safe_relative_dir("/tmp/dist"));
    }
}
