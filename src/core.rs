use std::io::{Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

mod types;
pub mod utils;

pub(crate) use types::MODE_MASK;
pub use types::{Metadata, OpenFlags};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Storage capability consumed by `ScopedFs`.
///
/// Every path handed to a `FileStore` by `ScopedFs` is already absolute and normalized.
/// Implementations report failures as `std::io::Error` values (wrapped into `anyhow::Error`)
/// so callers can inspect the `ErrorKind` with `downcast_ref`.
pub trait FileStore {
    type File: Read + Write + Seek;

    /// Short identifying name of the backend.
    fn name(&self) -> &str;

    /// Creates or truncates the file at `path` and opens it for reading and writing.
    fn create(&self, path: &Path) -> Result<Self::File> {
        self.open_with(path, &OpenFlags::create_truncate(), 0o666)
    }

    /// Opens the file at `path` read-only.
    fn open(&self, path: &Path) -> Result<Self::File> {
        self.open_with(path, &OpenFlags::read_only(), 0)
    }

    /// Generalized open call. `mode` is used only when the file gets created.
    fn open_with(&self, path: &Path, flags: &OpenFlags, mode: u32) -> Result<Self::File>;

    /// Creates a single directory. The parent must already exist.
    fn mkdir(&self, path: &Path, mode: u32) -> Result<()>;

    /// Creates a directory and all missing parents. Does nothing if `path` is already a directory.
    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()>;

    /// Removes a file or an empty directory.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Removes `path` and everything below it. A missing `path` is not an error.
    fn remove_all(&self, path: &Path) -> Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn stat(&self, path: &Path) -> Result<Metadata>;

    fn chmod(&self, path: &Path, mode: u32) -> Result<()>;

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()>;

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()>;

    /// Lists the immediate children of a directory, ordered by name.
    fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>>;
}

macro_rules! forward_file_store {
    ($($ty:ty),+) => {$(
        impl<S: FileStore> FileStore for $ty {
            type File = S::File;

            fn name(&self) -> &str {
                (**self).name()
            }

            fn create(&self, path: &Path) -> Result<Self::File> {
                (**self).create(path)
            }

            fn open(&self, path: &Path) -> Result<Self::File> {
                (**self).open(path)
            }

            fn open_with(&self, path: &Path, flags: &OpenFlags, mode: u32) -> Result<Self::File> {
                (**self).open_with(path, flags, mode)
            }

            fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
                (**self).mkdir(path, mode)
            }

            fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
                (**self).mkdir_all(path, mode)
            }

            fn remove(&self, path: &Path) -> Result<()> {
                (**self).remove(path)
            }

            fn remove_all(&self, path: &Path) -> Result<()> {
                (**self).remove_all(path)
            }

            fn rename(&self, from: &Path, to: &Path) -> Result<()> {
                (**self).rename(from, to)
            }

            fn stat(&self, path: &Path) -> Result<Metadata> {
                (**self).stat(path)
            }

            fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
                (**self).chmod(path, mode)
            }

            fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
                (**self).chown(path, uid, gid)
            }

            fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
                (**self).chtimes(path, atime, mtime)
            }

            fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>> {
                (**self).read_dir(path)
            }
        }
    )+};
}

forward_file_store!(&S, Arc<S>);
