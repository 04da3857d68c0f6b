use std::ffi::OsStr;
use std::path::PathBuf;

use crate::core::{FileStore, Metadata};
use crate::scoped::ScopedFs;

#[cfg(windows)]
const LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
const LIST_SEPARATOR: char = ':';

impl<S: FileStore> ScopedFs<S> {
    /// Simplified `which`: searches the directories of `search_path` (a `PATH`-style list) for an
    /// executable file named `cmd` and returns its resolved path.
    ///
    /// * Directories are searched in order; the first hit wins. Relative directories are resolved
    ///   against the working directory of this handle.
    /// * Directories that cannot be listed are skipped.
    /// * `path_ext` is a `PATHEXT`-style list (`.COM;.EXE`). When it is not empty, an entry named
    ///   `cmd` followed by one of the extensions matches as well, ignoring ASCII case. Within a
    ///   directory an exact `cmd` entry wins if it is listed before every suffixed one; otherwise
    ///   the extensions are tried in the order given.
    /// * An entry counts as executable if any execute bit is set, whatever its type. The identity
    ///   of the caller is not taken into account.
    ///
    /// ```
    /// use scoped_vfs::{MemStore, OpenFlags, ScopedFs};
    ///
    /// let fs = ScopedFs::new("/", MemStore::new()).unwrap();
    /// let flags = OpenFlags::new().write(true).create(true);
    /// fs.open_with("/bin/go", &flags, 0o755).unwrap();
    ///
    /// let search = std::env::join_paths(["/usr/local/bin", "/bin"]).unwrap();
    /// assert_eq!(fs.look_path("go", &search, ""), Some(fs.abs("/bin/go")));
    /// assert_eq!(fs.look_path("missing", &search, ""), None);
    /// ```
    pub fn look_path<P: AsRef<OsStr>>(
        &self,
        cmd: &str,
        search_path: P,
        path_ext: &str,
    ) -> Option<PathBuf> {
        let with_ext: Vec<String> = path_ext
            .split([';', LIST_SEPARATOR])
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!("{cmd}{ext}"))
            .collect();

        for dir in std::env::split_paths(&search_path) {
            let entries = match self.read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::trace!("look_path: skipping {}: {e}", dir.display());
                    continue;
                }
            };

            if let Some(entry) = pick(&entries, cmd, &with_ext) {
                let found = self.abs(&dir).join(entry.name());
                log::debug!("look_path: {cmd} found at {}", found.display());
                return Some(found);
            }
        }
        None
    }

    /// `look_path()` fed from the `PATH` and `PATHEXT` variables of the process environment.
    pub fn look_path_env(&self, cmd: &str) -> Option<PathBuf> {
        let search_path = std::env::var_os("PATH").unwrap_or_default();
        let path_ext = std::env::var("PATHEXT").unwrap_or_default();
        self.look_path(cmd, search_path, &path_ext)
    }
}

/// Chooses the entry of one directory listing that `cmd` refers to.
fn pick<'a>(entries: &'a [Metadata], cmd: &str, with_ext: &[String]) -> Option<&'a Metadata> {
    let executables = move || entries.iter().filter(|entry| entry.is_executable());
    let suffixed =
        |entry: &Metadata| with_ext.iter().any(|name| entry.name().eq_ignore_ascii_case(name));

    // Listing order decides between the exact name and the suffixed ones
    if let Some(first) = executables().find(|entry| entry.name() == cmd || suffixed(*entry)) {
        if first.name() == cmd {
            return Some(first);
        }
    }
    with_ext
        .iter()
        .find_map(|name| executables().find(|entry| entry.name().eq_ignore_ascii_case(name)))
}
