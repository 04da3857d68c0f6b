use std::path::Path;
use std::time::SystemTime;

use crate::core::{MODE_MASK, Metadata, utils};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EntryType {
    File,
    Directory,
}

/// A single node of `MemStore`: type, permission bits, owner, times and (for files) content.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    entry_type: EntryType,
    mode: u32,
    uid: u32,
    gid: u32,
    accessed: SystemTime,
    modified: SystemTime,
    content: Vec<u8>,
}

impl Entry {
    pub fn new(entry_type: EntryType, mode: u32) -> Entry {
        let now = SystemTime::now();
        Entry {
            entry_type,
            mode: mode & MODE_MASK,
            uid: 0,
            gid: 0,
            accessed: now,
            modified: now,
            content: Vec::new(),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn set_mode(&mut self, mode: u32) {
        self.mode = mode & MODE_MASK;
    }

    pub fn set_owner(&mut self, uid: u32, gid: u32) {
        self.uid = uid;
        self.gid = gid;
    }

    pub fn set_times(&mut self, accessed: SystemTime, modified: SystemTime) {
        self.accessed = accessed;
        self.modified = modified;
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn content_mut(&mut self) -> &mut Vec<u8> {
        self.modified = SystemTime::now();
        &mut self.content
    }

    pub(crate) fn truncate(&mut self) {
        self.content_mut().clear();
    }

    /// Snapshot of this entry as `Metadata`, named after the last segment of `path`.
    pub fn metadata(&self, path: &Path) -> Metadata {
        let name = utils::entry_name(path);
        let meta = match self.entry_type {
            EntryType::File => Metadata::file(name, self.content.len() as u64, self.mode),
            EntryType::Directory => Metadata::dir(name, self.mode),
        };
        meta.with_times(self.accessed, self.modified)
            .with_owner(self.uid, self.gid)
    }
}
