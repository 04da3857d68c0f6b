//! This module provides a `FileStore` implementation that maps to a real directory on the host
//! system.
//!
//! ### Key Features:
//! - **Isolated root**: Every path the store receives is interpreted below a designated host
//!   directory (`self.root`); `..` segments can never climb out of it.
//! - **Thin**: Operations go straight to `std::fs`; no state is tracked besides the root.
//! - **Cross‑platform**: Permission bits, ownership and the `mode` used for new files are honored
//!   on Unix. Elsewhere `chown` is unsupported and modes are synthesized from the read-only flag.

use std::fs::{self, DirBuilder, File, FileTimes, OpenOptions};
use std::io::ErrorKind;
use std::path::{Component, MAIN_SEPARATOR_STR, Path, PathBuf};
use std::time::SystemTime;

use anyhow::anyhow;

use crate::core::{FileStore, Metadata, OpenFlags, Result, utils};

/// A `FileStore` confined to a directory of the host filesystem.
///
/// The absolute path `/a/b` handed to the store refers to `<root>/a/b` on the host.
///
/// ### Example:
/// ```
/// use std::path::Path;
/// use scoped_vfs::{DirStore, FileStore};
///
/// let root = std::env::temp_dir().join("dir_store_doc");
/// let store = DirStore::new(&root).unwrap();
///
/// store.mkdir_all(Path::new("/docs"), 0o755).unwrap();
/// store.create(Path::new("/docs/note.txt")).unwrap();
/// assert!(root.join("docs/note.txt").exists());
///
/// store.remove_all(Path::new("/docs")).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf, // host-related absolute normalized path
}

impl DirStore {
    /// Creates a new store rooted at the host directory `root`.
    /// * `root` must be an absolute host path. If it does not exist it will be created.
    /// If `root` is not absolute or is not a directory, an error is returned.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if root.as_os_str().is_empty() {
            return Err(anyhow!("invalid root path: empty"));
        }
        if root.is_relative() {
            return Err(anyhow!("the root path must be absolute"));
        }
        if root.exists() && !root.is_dir() {
            return Err(anyhow!("{:?} is not a directory", root));
        }

        let root = utils::normalize(root);
        fs::create_dir_all(&root)?;
        log::debug!("DirStore rooted at {}", root.display());

        Ok(Self { root })
    }

    /// Returns the host directory the store is confined to.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns the host path that corresponds to the store path `path`.
    pub fn to_host<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let inner = Self::to_inner(path.as_ref());
        let mut host = self.root.clone();
        host.extend(inner.components().filter_map(|component| match component {
            Component::Normal(name) => Some(name),
            _ => None,
        }));
        host
    }

    fn to_inner(path: &Path) -> PathBuf {
        utils::normalize(Path::new(MAIN_SEPARATOR_STR).join(path))
    }

    fn to_metadata(name: String, meta: &fs::Metadata) -> Metadata {
        #[cfg(unix)]
        let (mode, uid, gid) = {
            use std::os::unix::fs::MetadataExt;
            (meta.mode(), meta.uid(), meta.gid())
        };
        #[cfg(not(unix))]
        let (mode, uid, gid) = {
            let mode = if meta.permissions().readonly() { 0o555 } else { 0o777 };
            (mode, 0, 0)
        };

        let result = if meta.is_dir() {
            Metadata::dir(name, mode)
        } else {
            Metadata::file(name, meta.len(), mode)
        };
        result
            .with_times(
                meta.accessed().unwrap_or(SystemTime::UNIX_EPOCH),
                meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            )
            .with_owner(uid, gid)
    }

    fn reject_root(path: &Path) -> Result<()> {
        if utils::is_root(Self::to_inner(path)) {
            return Err(utils::invalid_input(
                "invalid path: the root cannot be removed or moved".to_string(),
            ));
        }
        Ok(())
    }
}

impl FileStore for DirStore {
    type File = File;

    fn name(&self) -> &str {
        "DirStore"
    }

    fn open_with(&self, path: &Path, flags: &OpenFlags, mode: u32) -> Result<File> {
        let mut options = OpenOptions::new();
        options
            .read(flags.is_read())
            .write(flags.is_write())
            .append(flags.is_append())
            .truncate(flags.is_truncate() && flags.is_write())
            .create(flags.is_create())
            .create_new(flags.is_create_new());

        #[cfg(unix)]
        if flags.is_create() {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(options.open(self.to_host(path))?)
    }

    fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
        let mut builder = DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(builder.create(self.to_host(path))?)
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(builder.create(self.to_host(path))?)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        Self::reject_root(path)?;
        let host = self.to_host(path);
        if fs::symlink_metadata(&host)?.is_dir() {
            fs::remove_dir(&host)?;
        } else {
            fs::remove_file(&host)?;
        }
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        let host = self.to_host(path);
        let meta = match fs::symlink_metadata(&host) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if !meta.is_dir() {
            fs::remove_file(&host)?;
        } else if utils::is_root(Self::to_inner(path)) {
            // The root itself stays, only its content goes
            for entry in fs::read_dir(&host)? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    fs::remove_dir_all(entry.path())?;
                } else {
                    fs::remove_file(entry.path())?;
                }
            }
        } else {
            fs::remove_dir_all(&host)?;
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        Self::reject_root(from)?;
        Ok(fs::rename(self.to_host(from), self.to_host(to))?)
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        let meta = fs::metadata(self.to_host(path))?;
        Ok(Self::to_metadata(
            utils::entry_name(&Self::to_inner(path)),
            &meta,
        ))
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        let host = self.to_host(path);

        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            fs::Permissions::from_mode(mode)
        };
        #[cfg(not(unix))]
        let permissions = {
            let mut permissions = fs::metadata(&host)?.permissions();
            permissions.set_readonly(mode & 0o222 == 0);
            permissions
        };

        Ok(fs::set_permissions(host, permissions)?)
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        #[cfg(unix)]
        {
            Ok(std::os::unix::fs::chown(self.to_host(path), Some(uid), Some(gid))?)
        }
        #[cfg(not(unix))]
        {
            let _ = (path, uid, gid);
            Err(std::io::Error::new(
                ErrorKind::Unsupported,
                "chown is not supported on this platform",
            )
            .into())
        }
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        let host = self.to_host(path);
        let file = if cfg!(windows) {
            File::options().write(true).open(&host)?
        } else {
            File::open(&host)?
        };
        let times = FileTimes::new().set_accessed(atime).set_modified(mtime);
        Ok(file.set_times(times)?)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>> {
        let mut result = Vec::new();
        for entry in fs::read_dir(self.to_host(path))? {
            let entry = entry?;
            // Follow symlinks so that linked executables report the target's mode
            let meta = match fs::metadata(entry.path()) {
                Ok(meta) => meta,
                Err(_) => entry.metadata()?,
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            result.push(Self::to_metadata(name, &meta));
        }
        result.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(result)
    }
}
