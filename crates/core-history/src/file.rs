use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::{History, HistoryError, InMemoryHistory, SearchDirection};

/// Permission profile applied to the history file when it is written.
///
/// Each `*_owner_only` flag limits the matching permission to the owner;
/// when false the permission is granted to group and others as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAccessPermission {
    pub readable: bool,
    pub readable_owner_only: bool,
    pub writable: bool,
    pub writable_owner_only: bool,
    pub executable: bool,
    pub executable_owner_only: bool,
}

impl Default for FileAccessPermission {
    fn default() -> Self {
        Self {
            readable: true,
            readable_owner_only: true,
            writable: true,
            writable_owner_only: true,
            executable: false,
            executable_owner_only: true,
        }
    }
}

impl FileAccessPermission {
    /// Unix mode bits for this profile.
    pub fn mode(&self) -> u32 {
        let bits = |enabled: bool, owner_only: bool, bit: u32| -> u32 {
            match (enabled, owner_only) {
                (false, _) => 0,
                (true, true) => bit << 6,
                (true, false) => (bit << 6) | (bit << 3) | bit,
            }
        };
        bits(self.readable, self.readable_owner_only, 0o4)
            | bits(self.writable, self.writable_owner_only, 0o2)
            | bits(self.executable, self.executable_owner_only, 0o1)
    }
}

/// In-memory history backed by a text file, one entry per line. The file is
/// read once on open and rewritten on `stop`.
#[derive(Debug)]
pub struct FileHistory {
    path: PathBuf,
    permission: FileAccessPermission,
    inner: InMemoryHistory,
}

impl FileHistory {
    pub fn open(
        path: impl Into<PathBuf>,
        capacity: usize,
        permission: FileAccessPermission,
    ) -> Result<Self, HistoryError> {
        let path = path.into();
        let mut inner = InMemoryHistory::new(capacity)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                for line in contents.lines().filter(|l| !l.is_empty()) {
                    inner.push(line);
                }
                debug!(target: "history", path = %path.display(), entries = inner.size(), "history_loaded");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "history", path = %path.display(), "history_file_absent");
            }
            Err(e) => return Err(HistoryError::io("reading", &path, e)),
        }
        Ok(Self {
            path,
            permission,
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn permission(&self) -> FileAccessPermission {
        self.permission
    }

    fn write_file(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| HistoryError::io("creating directory for", &self.path, e))?;
        }
        let file = open_for_rewrite(&self.path, self.permission.mode())
            .map_err(|e| HistoryError::io("creating", &self.path, e))?;
        let mut out = BufWriter::new(file);
        for entry in self.inner.get_all() {
            writeln!(out, "{entry}").map_err(|e| HistoryError::io("writing", &self.path, e))?;
        }
        out.flush()
            .map_err(|e| HistoryError::io("flushing", &self.path, e))?;
        Ok(())
    }
}

/// Opens `path` for rewriting with `mode` already in force: a new file is
/// created with it and an existing one is narrowed before it is truncated.
#[cfg(unix)]
fn open_for_rewrite(path: &Path, mode: u32) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(mode)
        .open(path)?;
    // umask may have masked bits off a new file; an old file keeps its own mode
    file.set_permissions(fs::Permissions::from_mode(mode))?;
    file.set_len(0)?;
    Ok(file)
}

/// Windows has no mode bits; the profile is not applied there.
#[cfg(not(unix))]
fn open_for_rewrite(path: &Path, _mode: u32) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

impl History for FileHistory {
    fn push(&mut self, entry: &str) {
        self.inner.push(entry);
    }

    fn get(&self, index: usize) -> Option<&str> {
        self.inner.get(index)
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn previous_fetch(&mut self) -> Option<&str> {
        self.inner.previous_fetch()
    }

    fn next_fetch(&mut self) -> Option<&str> {
        self.inner.next_fetch()
    }

    fn is_navigating(&self) -> bool {
        self.inner.is_navigating()
    }

    fn set_current(&mut self, line: &str) {
        self.inner.set_current(line);
    }

    fn current(&self) -> &str {
        self.inner.current()
    }

    fn search_direction(&self) -> SearchDirection {
        self.inner.search_direction()
    }

    fn set_search_direction(&mut self, direction: SearchDirection) {
        self.inner.set_search_direction(direction);
    }

    fn search(&mut self, term: &str) -> Option<&str> {
        self.inner.search(term)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn get_all(&self) -> Vec<String> {
        self.inner.get_all()
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }

    fn stop(&mut self) -> Result<(), HistoryError> {
        self.write_file()?;
        trace!(target: "history", entries = self.inner.size(), mode = self.permission.mode(), "history_written");
        Ok(())
    }
}
