//! The scoped handle: a `FileStore` decorator that owns its own working directory.

mod helpers;
mod look_path;
mod resolve;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::{FileStore, Metadata, OpenFlags, Result, utils};

pub use resolve::resolve;

/// A filesystem handle with a private current working directory.
///
/// Every path-taking operation first resolves its path(s) against the working directory held by
/// this handle (see [`resolve`]) and then calls the same operation of the wrapped `FileStore`.
/// Results and errors of the store are returned untouched.
///
/// ### Internal state
///
/// * `store`: the wrapped backend. `FileStore` is implemented for `&S` and `Arc<S>`, so the
///   handle can borrow or share a store instead of owning it.
/// * `cwd`: current Working Directory, an **absolute normalized path**. It is set once at
///   construction and afterwards changed only by [`ScopedFs::chdir`].
///
/// ### Thread Safety
///
/// `chdir()` takes `&mut self`; concurrent use of one handle needs external locking
/// (e.g. `Mutex<ScopedFs<_>>`). Separate handles never affect each other.
///
/// ### Example
///
/// ```
/// use scoped_vfs::{MemStore, ScopedFs};
///
/// let store = MemStore::new();
/// let mut fs = ScopedFs::new("/home", &store).unwrap();
///
/// fs.chdir("me");
/// assert_eq!(fs.abs("you"), fs.abs("/home/me/you"));
///
/// fs.mkdir_all("docs", 0o755).unwrap();
/// assert!(fs.stat("/home/me/docs").unwrap().is_dir());
/// ```
#[derive(Debug, Clone)]
pub struct ScopedFs<S: FileStore> {
    store: S,
    cwd: PathBuf, // absolute normalized path
}

impl<S: FileStore> ScopedFs<S> {
    /// Creates a handle over `store` with the working directory `dir`.
    ///
    /// A relative `dir` is made absolute against the current directory of the process; an empty
    /// `dir` means the process directory itself. This is the only time process state is read.
    pub fn new<P: AsRef<Path>>(dir: P, store: S) -> Result<Self> {
        let dir = dir.as_ref();
        let base = if dir.as_os_str().is_empty() {
            std::env::current_dir()?
        } else {
            std::path::absolute(dir)?
        };

        Ok(Self {
            store,
            cwd: utils::normalize(base),
        })
    }

    /// Returns the wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Name of this wrapper.
    pub fn name(&self) -> &'static str {
        "ScopedFs"
    }

    /// Returns the current working directory.
    pub fn getwd(&self) -> &Path {
        self.cwd.as_path()
    }

    /// Changes the current working directory. A relative `path` is taken relative to the
    /// current one. The store is not consulted: changing into a missing directory succeeds and
    /// only later operations will fail.
    pub fn chdir<P: AsRef<Path>>(&mut self, path: P) {
        let target = self.abs(path);
        log::debug!("chdir {} -> {}", self.cwd.display(), target.display());
        self.cwd = target;
    }

    /// Returns the absolute normalized form of `path` for the current working directory.
    pub fn abs<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        resolve(path, &self.cwd)
    }

    fn resolved<P: AsRef<Path>>(&self, op: &str, path: P) -> PathBuf {
        let resolved = self.abs(path);
        log::trace!("{op} {}", resolved.display());
        resolved
    }

    /// Creates or truncates a file.
    pub fn create<P: AsRef<Path>>(&self, path: P) -> Result<S::File> {
        self.store.create(&self.resolved("create", path))
    }

    /// Opens a file read-only.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<S::File> {
        self.store.open(&self.resolved("open", path))
    }

    /// Generalized open: `flags` and `mode` are passed to the store as is.
    pub fn open_with<P: AsRef<Path>>(
        &self,
        path: P,
        flags: &OpenFlags,
        mode: u32,
    ) -> Result<S::File> {
        self.store
            .open_with(&self.resolved("open", path), flags, mode)
    }

    pub fn mkdir<P: AsRef<Path>>(&self, path: P, mode: u32) -> Result<()> {
        self.store.mkdir(&self.resolved("mkdir", path), mode)
    }

    pub fn mkdir_all<P: AsRef<Path>>(&self, path: P, mode: u32) -> Result<()> {
        self.store.mkdir_all(&self.resolved("mkdir_all", path), mode)
    }

    pub fn remove<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.store.remove(&self.resolved("remove", path))
    }

    pub fn remove_all<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.store.remove_all(&self.resolved("remove_all", path))
    }

    /// Renames `from` to `to`; both are resolved against the same working directory.
    pub fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> Result<()> {
        let from = self.resolved("rename", from);
        let to = self.resolved("rename to", to);
        self.store.rename(&from, &to)
    }

    pub fn stat<P: AsRef<Path>>(&self, path: P) -> Result<Metadata> {
        self.store.stat(&self.resolved("stat", path))
    }

    pub fn chmod<P: AsRef<Path>>(&self, path: P, mode: u32) -> Result<()> {
        self.store.chmod(&self.resolved("chmod", path), mode)
    }

    pub fn chown<P: AsRef<Path>>(&self, path: P, uid: u32, gid: u32) -> Result<()> {
        self.store.chown(&self.resolved("chown", path), uid, gid)
    }

    pub fn chtimes<P: AsRef<Path>>(
        &self,
        path: P,
        atime: SystemTime,
        mtime: SystemTime,
    ) -> Result<()> {
        self.store
            .chtimes(&self.resolved("chtimes", path), atime, mtime)
    }

    /// Lists a directory, ordered by name. An empty `path` lists the working directory.
    pub fn read_dir<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Metadata>> {
        self.store.read_dir(&self.resolved("read_dir", path))
    }
}

/// A scoped handle is itself a store, so handles can be layered or passed to code that is
/// generic over `FileStore`.
impl<S: FileStore> FileStore for ScopedFs<S> {
    type File = S::File;

    fn name(&self) -> &str {
        ScopedFs::name(self)
    }

    fn create(&self, path: &Path) -> Result<S::File> {
        ScopedFs::create(self, path)
    }

    fn open(&self, path: &Path) -> Result<S::File> {
        ScopedFs::open(self, path)
    }

    fn open_with(&self, path: &Path, flags: &OpenFlags, mode: u32) -> Result<S::File> {
        ScopedFs::open_with(self, path, flags, mode)
    }

    fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
        ScopedFs::mkdir(self, path, mode)
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
        ScopedFs::mkdir_all(self, path, mode)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        ScopedFs::remove(self, path)
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        ScopedFs::remove_all(self, path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        ScopedFs::rename(self, from, to)
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        ScopedFs::stat(self, path)
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        ScopedFs::chmod(self, path, mode)
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        ScopedFs::chown(self, path, uid, gid)
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        ScopedFs::chtimes(self, path, atime, mtime)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>> {
        ScopedFs::read_dir(self, path)
    }
}
