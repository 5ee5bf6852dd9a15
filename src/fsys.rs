//! Filesystem scanning helpers: line counts, directory sizes, listings.
//!
//! Traversal is `walkdir` with the same shape the rest of the ecosystem
//! uses it: iterate, skip entries that error with a warning, filter by
//! type. Only the root path itself is load-bearing — if it cannot be read
//! the helpers fail; anything below it degrades to a logged skip.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn read_error(path: &Path) -> impl FnOnce(std::io::Error) -> FsError + '_ {
    move |source| FsError::Read {
        path: path.to_path_buf(),
        source,
    }
}

/// Number of lines in the file at `path`.
pub fn count_lines(path: impl AsRef<Path>) -> Result<usize, FsError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(read_error(path))?;
    let mut count = 0;
    for line in BufReader::new(file).lines() {
        line.map_err(read_error(path))?;
        count += 1;
    }
    Ok(count)
}

/// Total size in bytes of all files under `root`. Entries that cannot be
/// read are skipped with a warning; a missing root is an error.
pub fn dir_size(root: impl AsRef<Path>) -> Result<u64, FsError> {
    let root = root.as_ref();
    root.metadata().map_err(read_error(root))?;

    let mut total = 0u64;
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => total += meta.len(),
            Err(err) => warn!(path = %entry.path().display(), %err, "skipping unreadable metadata"),
        }
    }
    Ok(total)
}

/// Sorted list of files under `root`, optionally bounded to `max_depth`
/// levels and filtered to an extension (without the dot).
pub fn list_files(
    root: impl AsRef<Path>,
    max_depth: Option<usize>,
    extension: Option<&str>,
) -> Result<Vec<PathBuf>, FsError> {
    let root = root.as_ref();
    root.metadata().map_err(read_error(root))?;

    let mut walker = WalkDir::new(root);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(wanted) = extension {
            let matches = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == wanted);
            if !matches {
                continue;
            }
        }
        files.push(entry.into_path());
    }
    files.sort();
    Ok(files)
}

/// Reads up to `limit` bytes from the start of a file. Used by the media
/// sniffer; short files yield what they have.
pub(crate) fn read_header(path: &Path, limit: u64) -> Result<Vec<u8>, FsError> {
    let file = File::open(path).map_err(read_error(path))?;
    let mut header = Vec::with_capacity(limit as usize);
    file.take(limit)
        .read_to_end(&mut header)
        .map_err(read_error(path))?;
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_count_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt");
        fs::write(&path, "one\ntwo\nthree\n").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 3);

        fs::write(&path, "").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 0);

        assert!(count_lines(dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_dir_size_sums_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), [0u8; 10]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.bin"), [0u8; 32]).unwrap();

        assert_eq!(dir_size(dir.path()).unwrap(), 42);
        assert!(dir_size(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_list_files_depth_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.rs"), "").unwrap();

        let all_rs = list_files(dir.path(), None, Some("rs")).unwrap();
        assert_eq!(all_rs.len(), 2);
        assert!(all_rs.windows(2).all(|w| w[0] <= w[1]));

        let shallow = list_files(dir.path(), Some(1), Some("rs")).unwrap();
        assert_eq!(shallow.len(), 1);
        assert!(shallow[0].ends_with("a.rs"));

        let everything = list_files(dir.path(), None, None).unwrap();
        assert_eq!(everything.len(), 3);
    }
}
