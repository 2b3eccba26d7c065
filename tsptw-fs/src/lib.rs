//! Filesystem helpers for the TSPTW tooling, built on `cap-std` and `camino`.
//!
//! Every helper resolves the parent directory of a UTF-8 path with ambient
//! authority and then works relative to that directory handle, so callers
//! never touch `std::fs` directly.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// Open an existing file for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open `path` for appending, creating the file and any missing parent
/// directories first.
///
/// # Examples
/// ```no_run
/// use std::io::Write;
///
/// use camino::Utf8Path;
///
/// let mut results = tsptw_fs::append_utf8_file(Utf8Path::new("results/runs.txt"))?;
/// writeln!(results, "rc_201.1 | cp-lns | closed (improved) | 444.54")?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn append_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let mut options = fs_utf8::OpenOptions::new();
    options.append(true).create(true);
    dir.open_with(name.as_str(), &options)
}

/// Return whether `path` exists and is a regular file.
///
/// A missing file is reported as an error of kind
/// [`io::ErrorKind::NotFound`] rather than `Ok(false)`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Open the directory holding `path` and return it with the file name.
fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (base, relative) = split_root(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?.create_dir_all(&relative)
}

/// Split `dir` into the ambient directory to open and the part below it.
///
/// Absolute paths split at their root (and drive prefix on Windows);
/// relative paths resolve from the current directory.
fn split_root(dir: &Utf8Path) -> io::Result<(Utf8PathBuf, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let base = match std_dir.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR.to_string())
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string()),
        _ => return Ok((Utf8PathBuf::from("."), dir.to_path_buf())),
    };
    let relative = dir
        .strip_prefix(&base)
        .map_err(|_| io::Error::other(format!("{dir} does not start with {base}")))?
        .to_path_buf();
    Ok((base, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::{Read, Write};
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        (tmp, root)
    }

    #[rstest]
    fn reads_back_written_file(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let path = root.join("tri.txt");
        std::fs::write(&path, "3\n").expect("write instance");

        let mut contents = String::new();
        open_utf8_file(&path)
            .expect("open")
            .read_to_string(&mut contents)
            .expect("read");
        assert_eq!(contents, "3\n");
    }

    #[rstest]
    fn append_creates_parents_and_keeps_earlier_lines(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let path = root.join("results").join("nested").join("runs.txt");
        for line in ["first", "second"] {
            let mut file = append_utf8_file(&path).expect("append");
            writeln!(file, "{line}").expect("write line");
        }
        let contents = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(contents, "first\nsecond\n");
    }

    #[rstest]
    fn file_is_file_distinguishes_directories(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let file = root.join("instance.txt");
        std::fs::write(&file, "1\n0\n0 1\n").expect("write file");
        let dir = root.join("instances");
        std::fs::create_dir(&dir).expect("create dir");

        assert!(file_is_file(&file).expect("inspect file"));
        assert!(!file_is_file(&dir).expect("inspect dir"));
    }

    #[rstest]
    fn missing_file_is_not_found(workspace: (TempDir, Utf8PathBuf)) {
        let (_tmp, root) = workspace;
        let err = file_is_file(&root.join("absent.txt")).expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    #[case("results")]
    #[case("out/runs")]
    fn relative_paths_resolve_from_current_dir(#[case] dir: &str) {
        let (base, relative) = split_root(Utf8Path::new(dir)).expect("split");
        assert_eq!(base, Utf8PathBuf::from("."));
        assert_eq!(relative, Utf8PathBuf::from(dir));
    }

    #[cfg(unix)]
    #[rstest]
    fn absolute_paths_split_at_root() {
        let (base, relative) = split_root(Utf8Path::new("/tmp/results")).expect("split");
        assert_eq!(base, Utf8PathBuf::from("/"));
        assert_eq!(relative, Utf8PathBuf::from("tmp/results"));
    }
}
