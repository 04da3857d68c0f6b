//! This module provides a `FileStore` implementation that keeps everything in memory.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::core::{FileStore, Metadata, OpenFlags, Result, utils};
use crate::vfs::{Entry, EntryType, MemFile};

/// Mode of directories created implicitly (parents of new files).
const IMPLICIT_DIR_MODE: u32 = 0o755;

type Node = Arc<Mutex<Entry>>;

/// An in-memory `FileStore`: the fake backend used to exercise `ScopedFs` without any real
/// storage.
///
/// ### Internal state
///
/// * `entries`: the map that holds all files and directories.
///   - Key: `PathBuf`, an **absolute normalized path** (no `..`, no `//`, no trailing `/`).
///   - Value: the shared `Entry` (type, mode, owner, times, content). Open `MemFile` handles hold
///     a clone of the same `Arc`, so the entry behaves like an inode.
///   - `BTreeMap` keeps the children of a directory contiguous and ordered by name, which gives
///     `read_dir()` its ordering and makes subtree queries a range scan.
///
/// ### Invariants
///
/// 1. **Root existence**: `/` is always present and is a `Directory`. Other roots (drive roots
///    on Windows) are treated as existing directories even before anything is stored below them.
/// 2. **Parent consistency**: for any entry at `/a/b/c` there is a `Directory` entry `/a/b`.
/// 3. **Path normalization**: relative paths handed to the store are taken relative to `/`.
///
/// ### Semantics
///
/// - Creating a file creates its missing parent directories (mode `0o755`).
/// - `mkdir()` requires an existing parent, `mkdir_all()` does not.
/// - Opening a directory as a file fails with `IsADirectory`.
///
/// ### Thread Safety
///
/// All methods take `&self`; the map and every entry sit behind their own `Mutex`.
///
/// ### Example
///
/// ```
/// use std::path::Path;
/// use scoped_vfs::{FileStore, MemStore};
///
/// let store = MemStore::new();
/// store.mkdir_all(Path::new("/docs"), 0o755).unwrap();
/// store.create(Path::new("/docs/note.txt")).unwrap();
///
/// let names: Vec<_> = store
///     .read_dir(Path::new("/docs"))
///     .unwrap()
///     .iter()
///     .map(|m| m.name().to_string())
///     .collect();
/// assert_eq!(names, ["note.txt"]);
/// ```
#[derive(Debug)]
pub struct MemStore {
    entries: Mutex<BTreeMap<PathBuf, Node>>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    /// Creates an empty store that contains only the root directory.
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            PathBuf::from(MAIN_SEPARATOR_STR),
            Self::node(EntryType::Directory, IMPLICIT_DIR_MODE),
        );
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn node(entry_type: EntryType, mode: u32) -> Node {
        Arc::new(Mutex::new(Entry::new(entry_type, mode)))
    }

    fn to_inner(path: &Path) -> PathBuf {
        utils::normalize(Path::new(MAIN_SEPARATOR_STR).join(path))
    }

    fn lookup(entries: &BTreeMap<PathBuf, Node>, path: &Path) -> Result<Node> {
        match entries.get(path) {
            Some(node) => Ok(node.clone()),
            None if utils::is_root(path) => Ok(Self::node(EntryType::Directory, IMPLICIT_DIR_MODE)),
            None => Err(utils::not_found(path)),
        }
    }

    /// Checks that `path` exists and is a directory.
    fn expect_dir(entries: &BTreeMap<PathBuf, Node>, path: &Path) -> Result<()> {
        let node = Self::lookup(entries, path)?;
        if utils::lock(&node).is_dir() {
            Ok(())
        } else {
            Err(utils::not_a_directory(path))
        }
    }

    /// Keys strictly below `path`, in order.
    fn descendants(entries: &BTreeMap<PathBuf, Node>, path: &Path) -> Vec<PathBuf> {
        entries
            .range::<Path, _>((Bound::Excluded(path), Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(path))
            .cloned()
            .collect()
    }

    /// Creates `path` and every missing ancestor as directories.
    fn mkdir_chain(entries: &mut BTreeMap<PathBuf, Node>, path: &Path, mode: u32) -> Result<()> {
        // Looking for the first existing ancestor
        let mut missing = Vec::new();
        let mut current = Some(path);
        while let Some(dir) = current {
            match entries.get(dir) {
                Some(node) => {
                    if !utils::lock(node).is_dir() {
                        return Err(utils::not_a_directory(dir));
                    }
                    break;
                }
                None if utils::is_root(dir) => break,
                None => missing.push(dir.to_path_buf()),
            }
            current = dir.parent();
        }

        for dir in missing.into_iter().rev() {
            entries.insert(dir, Self::node(EntryType::Directory, mode));
        }
        Ok(())
    }

    fn with_entry<F: FnOnce(&mut Entry)>(&self, path: &Path, f: F) -> Result<()> {
        let path = Self::to_inner(path);
        let mut entries = utils::lock(&self.entries);
        let node = match entries.get(&path) {
            Some(node) => node.clone(),
            // Materialize an implicit root so that changes to it stick
            None if utils::is_root(&path) => entries
                .entry(path.clone())
                .or_insert_with(|| Self::node(EntryType::Directory, IMPLICIT_DIR_MODE))
                .clone(),
            None => return Err(utils::not_found(&path)),
        };
        drop(entries);

        let mut entry = utils::lock(&node);
        f(&mut *entry);
        Ok(())
    }
}

impl FileStore for MemStore {
    type File = MemFile;

    fn name(&self) -> &str {
        "MemStore"
    }

    fn open_with(&self, path: &Path, flags: &OpenFlags, mode: u32) -> Result<MemFile> {
        let path = Self::to_inner(path);
        let mut entries = utils::lock(&self.entries);

        let node = match entries.get(&path) {
            Some(node) => {
                if flags.is_create_new() {
                    return Err(utils::already_exists(&path));
                }
                let mut entry = utils::lock(node);
                if entry.is_dir() {
                    return Err(utils::is_a_directory(&path));
                }
                if flags.is_truncate() && flags.is_write() {
                    entry.truncate();
                }
                node.clone()
            }
            None => {
                if !flags.is_create() {
                    return Err(utils::not_found(&path));
                }
                if utils::is_root(&path) {
                    return Err(utils::is_a_directory(&path));
                }
                if let Some(parent) = path.parent() {
                    Self::mkdir_chain(&mut entries, parent, IMPLICIT_DIR_MODE)?;
                }
                let node = Self::node(EntryType::File, mode);
                entries.insert(path.clone(), node.clone());
                node
            }
        };

        Ok(MemFile::new(path, node, *flags))
    }

    fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
        let path = Self::to_inner(path);
        let mut entries = utils::lock(&self.entries);

        if entries.contains_key(&path) || utils::is_root(&path) {
            return Err(utils::already_exists(&path));
        }
        if let Some(parent) = path.parent() {
            Self::expect_dir(&entries, parent)?;
        }
        entries.insert(path, Self::node(EntryType::Directory, mode));
        Ok(())
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let path = Self::to_inner(path);
        let mut entries = utils::lock(&self.entries);
        Self::mkdir_chain(&mut entries, &path, mode)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let path = Self::to_inner(path);
        if utils::is_root(&path) {
            return Err(utils::invalid_input(format!(
                "the root cannot be removed: {}",
                path.display()
            )));
        }

        let mut entries = utils::lock(&self.entries);
        if !entries.contains_key(&path) {
            return Err(utils::not_found(&path));
        }
        if !Self::descendants(&entries, &path).is_empty() {
            return Err(utils::directory_not_empty(&path));
        }
        entries.remove(&path);
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        let path = Self::to_inner(path);
        let mut entries = utils::lock(&self.entries);

        for key in Self::descendants(&entries, &path) {
            entries.remove(&key);
        }
        // The root itself always stays
        if !utils::is_root(&path) {
            entries.remove(&path);
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = Self::to_inner(from);
        let to = Self::to_inner(to);
        if from == to {
            return Ok(());
        }
        if utils::is_root(&from) || to.starts_with(&from) {
            return Err(utils::invalid_input(format!(
                "cannot move {} to {}",
                from.display(),
                to.display()
            )));
        }

        let mut entries = utils::lock(&self.entries);
        let source = entries
            .get(&from)
            .cloned()
            .ok_or_else(|| utils::not_found(&from))?;
        let source_is_dir = utils::lock(&source).is_dir();

        if let Some(target) = entries.get(&to) {
            let target_is_dir = utils::lock(target).is_dir();
            match (source_is_dir, target_is_dir) {
                (false, true) => return Err(utils::is_a_directory(&to)),
                (true, false) => return Err(utils::not_a_directory(&to)),
                (true, true) if !Self::descendants(&entries, &to).is_empty() => {
                    return Err(utils::directory_not_empty(&to));
                }
                _ => {}
            }
        } else if utils::is_root(&to) {
            return Err(utils::already_exists(&to));
        }
        if let Some(parent) = to.parent() {
            Self::expect_dir(&entries, parent)?;
        }

        let mut moved = vec![from.clone()];
        moved.extend(Self::descendants(&entries, &from));
        for old in moved {
            let Some(node) = entries.remove(&old) else {
                continue;
            };
            let new = match old.strip_prefix(&from) {
                Ok(rest) if !rest.as_os_str().is_empty() => to.join(rest),
                _ => to.clone(),
            };
            entries.insert(new, node);
        }
        Ok(())
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        let path = Self::to_inner(path);
        let node = Self::lookup(&utils::lock(&self.entries), &path)?;
        let metadata = utils::lock(&node).metadata(&path);
        Ok(metadata)
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        self.with_entry(path, |entry| entry.set_mode(mode))
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.with_entry(path, |entry| entry.set_owner(uid, gid))
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        self.with_entry(path, |entry| entry.set_times(atime, mtime))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>> {
        let path = Self::to_inner(path);
        let entries = utils::lock(&self.entries);
        Self::expect_dir(&entries, &path)?;

        Ok(entries
            .range::<Path, _>((Bound::Excluded(path.as_path()), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&path))
            .filter(|(key, _)| key.parent() == Some(path.as_path()))
            .map(|(key, node)| utils::lock(node).metadata(key))
            .collect())
    }
}
