use std::time::SystemTime;

/// Permission bits that survive `chmod` and are reported by `Metadata::mode()`.
pub(crate) const MODE_MASK: u32 = 0o7777;

/// Any of the owner, group or other execute bits.
const EXEC_BITS: u32 = 0o111;

/// Description of a single file or directory as reported by a `FileStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    name: String,
    len: u64,
    mode: u32,
    is_dir: bool,
    accessed: SystemTime,
    modified: SystemTime,
    uid: u32,
    gid: u32,
}

impl Metadata {
    /// Metadata of a regular file. Times default to `UNIX_EPOCH`, owner to `0:0`.
    pub fn file<S: Into<String>>(name: S, len: u64, mode: u32) -> Self {
        Self {
            name: name.into(),
            len,
            mode: mode & MODE_MASK,
            is_dir: false,
            accessed: SystemTime::UNIX_EPOCH,
            modified: SystemTime::UNIX_EPOCH,
            uid: 0,
            gid: 0,
        }
    }

    /// Metadata of a directory. Times default to `UNIX_EPOCH`, owner to `0:0`.
    pub fn dir<S: Into<String>>(name: S, mode: u32) -> Self {
        Self {
            is_dir: true,
            ..Self::file(name, 0, mode)
        }
    }

    pub fn with_times(mut self, accessed: SystemTime, modified: SystemTime) -> Self {
        self.accessed = accessed;
        self.modified = modified;
        self
    }

    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    /// Final path segment (the root reports itself).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Permission bits, masked with `0o7777`.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Approximate check: true if any execute bit is set.
    /// The identity of the caller is not taken into account.
    pub fn is_executable(&self) -> bool {
        self.mode & EXEC_BITS != 0
    }

    pub fn accessed(&self) -> SystemTime {
        self.accessed
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn gid(&self) -> u32 {
        self.gid
    }
}

/// Flags for `FileStore::open_with`, shaped like `std::fs::OpenOptions`.
///
/// ```
/// use scoped_vfs::OpenFlags;
///
/// let flags = OpenFlags::new().write(true).append(true).create(true);
/// assert!(flags.is_write() && flags.is_append() && flags.is_create());
/// assert!(!flags.is_truncate());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    read: bool,
    write: bool,
    append: bool,
    truncate: bool,
    create: bool,
    create_new: bool,
}

impl OpenFlags {
    /// All flags cleared.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only() -> Self {
        Self::new().read(true)
    }

    /// Read-write, create if missing, truncate if present.
    pub fn create_truncate() -> Self {
        Self::new().read(true).write(true).create(true).truncate(true)
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Append implies write access.
    pub fn is_write(&self) -> bool {
        self.write || self.append
    }

    pub fn is_append(&self) -> bool {
        self.append
    }

    pub fn is_truncate(&self) -> bool {
        self.truncate
    }

    pub fn is_create(&self) -> bool {
        self.create || self.create_new
    }

    pub fn is_create_new(&self) -> bool {
        self.create_new
    }
}
