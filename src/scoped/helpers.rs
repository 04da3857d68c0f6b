//! Convenience operations built from the dispatch layer: whole-file reads and writes, existence
//! checks and temporary files and directories.

use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::core::{FileStore, OpenFlags, Result, utils};
use crate::scoped::ScopedFs;

/// Attempts at finding an unused temporary name before giving up.
const TEMP_ATTEMPTS: usize = 100;

impl<S: FileStore> ScopedFs<S> {
    /// Reads the entire contents of a file.
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        let mut file = self.open(path)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Writes `content` to a file, creating it with `mode` if needed and truncating it otherwise.
    pub fn write_file<P: AsRef<Path>>(&self, path: P, content: &[u8], mode: u32) -> Result<()> {
        let flags = OpenFlags::new().write(true).create(true).truncate(true);
        let mut file = self.open_with(path, &flags, mode)?;
        file.write_all(content)?;
        file.flush()?;
        Ok(())
    }

    /// Checks whether `path` exists. Errors other than "not found" are returned.
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(e) if utils::is_not_found(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Creates a new directory with a unique name inside `dir` and returns its path.
    ///
    /// The name is `prefix` followed by a random string; if `prefix` contains a `*`, the random
    /// string replaces the last `*` instead. `dir` must exist. An empty `dir` means the host's
    /// temporary directory (`std::env::temp_dir()`).
    pub fn temp_dir<P: AsRef<Path>>(&self, dir: P, prefix: &str) -> Result<PathBuf> {
        let base = self.temp_base(dir.as_ref());
        let mut last_err = None;
        for _ in 0..TEMP_ATTEMPTS {
            let candidate = base.join(temp_name(prefix));
            match self.mkdir(&candidate, 0o700) {
                Ok(()) => return Ok(candidate),
                Err(e) if utils::error_kind(&e) == Some(ErrorKind::AlreadyExists) => {
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| utils::already_exists(&base)))
    }

    /// Creates a new file with a unique name inside `dir`, opened for reading and writing, and
    /// returns its path together with the handle. Naming follows `temp_dir()`.
    pub fn temp_file<P: AsRef<Path>>(&self, dir: P, prefix: &str) -> Result<(PathBuf, S::File)> {
        let base = self.temp_base(dir.as_ref());
        let flags = OpenFlags::new().read(true).write(true).create_new(true);
        let mut last_err = None;
        for _ in 0..TEMP_ATTEMPTS {
            let candidate = base.join(temp_name(prefix));
            match self.open_with(&candidate, &flags, 0o600) {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if utils::error_kind(&e) == Some(ErrorKind::AlreadyExists) => {
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| utils::already_exists(&base)))
    }

    fn temp_base(&self, dir: &Path) -> PathBuf {
        if dir.as_os_str().is_empty() {
            self.abs(std::env::temp_dir())
        } else {
            self.abs(dir)
        }
    }
}

fn temp_name(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    match prefix.rfind('*') {
        Some(pos) => format!("{}{random}{}", &prefix[..pos], &prefix[pos + 1..]),
        None => format!("{prefix}{random}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemStore;
    use std::io::{Seek, SeekFrom};

    fn setup_fs() -> ScopedFs<MemStore> {
        ScopedFs::new("/home", MemStore::new()).unwrap()
    }

    mod files {
        use super::*;

        #[test]
        fn test_write_relative_read_absolute() -> Result<()> {
            let fs = setup_fs();
            fs.write_file("homefile.txt", b"homefile", 0o644)?;
            assert_eq!(fs.read_file("/home/homefile.txt")?, b"homefile");
            assert_eq!(fs.read_file("homefile.txt")?, b"homefile");
            Ok(())
        }

        #[test]
        fn test_write_absolute_read_relative() -> Result<()> {
            let mut fs = setup_fs();
            fs.write_file("/tmp/tmpfile.txt", b"tmpfile", 0o644)?;
            fs.chdir("/tmp");
            assert_eq!(fs.read_file("tmpfile.txt")?, b"tmpfile");
            Ok(())
        }

        #[test]
        fn test_write_file_truncates() -> Result<()> {
            let fs = setup_fs();
            fs.write_file("f", b"a long first version", 0o644)?;
            fs.write_file("f", b"short", 0o600)?;
            assert_eq!(fs.read_file("f")?, b"short");
            assert_eq!(fs.stat("f")?.mode(), 0o644); // mode only applies on creation
            Ok(())
        }

        #[test]
        fn test_read_file_missing() {
            let fs = setup_fs();
            let err = fs.read_file("nope").unwrap_err();
            assert!(utils::is_not_found(&err));
        }

        #[test]
        fn test_exists() -> Result<()> {
            let fs = setup_fs();
            assert!(!fs.exists("me/mefile.txt")?);
            fs.write_file("/home/me/mefile.txt", b"", 0o644)?;
            assert!(fs.exists("me/mefile.txt")?);
            assert!(fs.exists("me")?);
            assert!(fs.exists("/")?);
            Ok(())
        }

        #[test]
        fn test_exists_below_a_file() -> Result<()> {
            let fs = setup_fs();
            fs.write_file("file", b"", 0o644)?;
            assert!(!fs.exists("file/child")?);
            Ok(())
        }
    }

    mod temp {
        use super::*;

        #[test]
        fn test_temp_dir_relative() -> Result<()> {
            let fs = setup_fs();
            fs.mkdir_all("me", 0o755)?;
            let dir = fs.temp_dir("me", "scoped")?;

            assert!(dir.starts_with(fs.abs("/home/me")));
            assert!(utils::entry_name(&dir).starts_with("scoped"));
            let meta = fs.stat(&dir)?;
            assert!(meta.is_dir());
            assert_eq!(meta.mode(), 0o700);
            Ok(())
        }

        #[test]
        fn test_temp_dir_absolute() -> Result<()> {
            let fs = setup_fs();
            fs.mkdir_all("/etc", 0o755)?;
            let dir = fs.temp_dir("/etc", "scoped")?;
            assert_eq!(dir.parent(), Some(fs.abs("/etc").as_path()));
            Ok(())
        }

        #[test]
        fn test_temp_dir_empty_uses_host_temp_dir() -> Result<()> {
            let fs = setup_fs();
            let host_tmp = fs.abs(std::env::temp_dir());
            fs.mkdir_all(&host_tmp, 0o755)?;
            let dir = fs.temp_dir("", "scoped")?;
            assert!(dir.starts_with(&host_tmp));
            Ok(())
        }

        #[test]
        fn test_temp_dir_names_are_unique() -> Result<()> {
            let fs = setup_fs();
            fs.mkdir_all(std::env::temp_dir(), 0o755)?;
            let first = fs.temp_dir("", "x")?;
            let second = fs.temp_dir("", "x")?;
            assert_ne!(first, second);
            assert_eq!(first.parent(), second.parent());
            Ok(())
        }

        #[test]
        fn test_temp_dir_missing_parent() {
            let fs = setup_fs();
            let err = fs.temp_dir("/missing", "x").unwrap_err();
            assert!(utils::is_not_found(&err));
        }

        #[test]
        fn test_temp_file_relative() -> Result<()> {
            let fs = setup_fs();
            let (path, mut file) = fs.temp_file("me", "scoped")?;
            assert!(path.starts_with(fs.abs("/home/me")));
            assert_eq!(fs.stat(&path)?.mode(), 0o600);

            file.write_all(b"temp")?;
            file.seek(SeekFrom::Start(0))?;
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            assert_eq!(content, "temp");
            assert_eq!(fs.read_file(&path)?, b"temp");
            Ok(())
        }

        #[test]
        fn test_temp_file_pattern() -> Result<()> {
            let fs = setup_fs();
            let (path, _) = fs.temp_file("/etc", "log-*.txt")?;
            let name = utils::entry_name(&path);
            assert!(name.starts_with("log-"));
            assert!(name.ends_with(".txt"));
            assert!(!name.contains('*'));
            Ok(())
        }

        #[test]
        fn test_temp_name() {
            assert!(temp_name("pre").starts_with("pre"));
            assert_eq!(temp_name("pre").len(), "pre".len() + 32);
            assert!(temp_name("a*b").ends_with('b'));
        }
    }
}
