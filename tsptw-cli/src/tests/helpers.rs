//! Temporary workspaces holding instance files for CLI tests.

use camino::Utf8PathBuf;
use tempfile::TempDir;

/// Three nodes one unit apart with wide windows; the tour `1 2` costs 3.
pub(super) const TRIANGLE: &str = "\
# three nodes, unit distances
3
0 1 1
1 0 1
1 1 0
0 100
0 100
0 100
";

/// Nodes on a line where node 1 closes at time 1, so visiting node 2 first
/// is late.
pub(super) const TIGHT_LINE: &str = "3\n0 1 2\n1 0 1\n2 1 0\n0 100\n0 1\n0 100\n";

/// Four nodes on a line, each customer closing one unit after the previous
/// one, so `1 2 3` (cost 6) is the only feasible tour.
pub(super) const STAIRCASE: &str = "\
4
0 1 2 3
1 0 1 2
2 1 0 1
3 2 1 0
0 100
0 1
0 2
0 3
";

#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write workspace file");
        path
    }
}
