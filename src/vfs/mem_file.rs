use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::{Metadata, OpenFlags, utils};
use crate::vfs::Entry;

/// Open file handle returned by `MemStore`.
///
/// The handle shares its entry with the store, so writes are visible to every other handle
/// and to later `stat()`/`read_dir()` calls, and they survive a `rename()` of the file.
#[derive(Debug)]
pub struct MemFile {
    path: PathBuf,
    node: Arc<Mutex<Entry>>,
    flags: OpenFlags,
    pos: u64,
}

impl MemFile {
    pub(crate) fn new(path: PathBuf, node: Arc<Mutex<Entry>>, flags: OpenFlags) -> Self {
        Self {
            path,
            node,
            flags,
            pos: 0,
        }
    }

    /// Path the file was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> Metadata {
        utils::lock(&self.node).metadata(&self.path)
    }
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.flags.is_read() {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                format!("{} is not opened for reading", self.path.display()),
            ));
        }
        let entry = utils::lock(&self.node);
        let content = entry.content();
        let start = usize::try_from(self.pos)
            .unwrap_or(usize::MAX)
            .min(content.len());
        let n = buf.len().min(content.len() - start);
        buf[..n].copy_from_slice(&content[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.flags.is_write() {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                format!("{} is not opened for writing", self.path.display()),
            ));
        }
        let mut entry = utils::lock(&self.node);
        let content = entry.content_mut();
        if self.flags.is_append() {
            self.pos = content.len() as u64;
        }
        let end = usize::try_from(self.pos)
            .ok()
            .and_then(|start| start.checked_add(buf.len()))
            .ok_or_else(|| {
                io::Error::new(
                    ErrorKind::FileTooLarge,
                    format!("{}: write past the maximum file size", self.path.display()),
                )
            })?;
        let start = end - buf.len();
        if end > content.len() {
            content
                .try_reserve(end - content.len())
                .map_err(|e| io::Error::new(ErrorKind::OutOfMemory, e))?;
            content.resize(end, 0);
        }
        content[start..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = utils::lock(&self.node).content().len() as u64;
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(offset) => len.checked_add_signed(offset),
            SeekFrom::Current(offset) => self.pos.checked_add_signed(offset),
        };
        match target {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::EntryType;

    fn setup_file(flags: OpenFlags, content: &[u8]) -> MemFile {
        let mut entry = Entry::new(EntryType::File, 0o644);
        entry.content_mut().extend_from_slice(content);
        MemFile::new(
            PathBuf::from("/file.txt"),
            Arc::new(Mutex::new(entry)),
            flags,
        )
    }

    #[test]
    fn test_read_to_end() {
        let mut file = setup_file(OpenFlags::read_only(), b"Hello");
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"Hello");
    }

    #[test]
    fn test_write_then_read_back() {
        let mut file = setup_file(OpenFlags::create_truncate(), b"");
        file.write_all(b"abc").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let mut buf = String::new();
        file.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "abc");
        assert_eq!(file.metadata().len(), 3);
    }

    #[test]
    fn test_overwrite_in_the_middle() {
        let mut file = setup_file(OpenFlags::new().read(true).write(true), b"Hello");
        file.seek(SeekFrom::Start(1)).unwrap();
        file.write_all(b"EL").unwrap();
        assert_eq!(utils::lock(&file.node).content(), b"HELlo");
    }

    #[test]
    fn test_write_past_end_fills_with_zeros() {
        let mut file = setup_file(OpenFlags::new().write(true), b"ab");
        file.seek(SeekFrom::End(2)).unwrap();
        file.write_all(b"z").unwrap();
        assert_eq!(utils::lock(&file.node).content(), b"ab\0\0z");
    }

    #[test]
    fn test_append_always_writes_at_end() {
        let mut file = setup_file(OpenFlags::new().append(true), b"Hello");
        file.seek(SeekFrom::Start(0)).unwrap();
        file.write_all(b", World").unwrap();
        assert_eq!(utils::lock(&file.node).content(), b"Hello, World");
    }

    #[test]
    fn test_write_at_maximum_offset_fails() {
        let mut file = setup_file(OpenFlags::new().write(true), b"ab");
        file.seek(SeekFrom::Start(u64::MAX)).unwrap();
        let err = file.write(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
        assert_eq!(utils::lock(&file.node).content(), b"ab");
    }

    #[test]
    fn test_write_beyond_addressable_size_fails() {
        let mut file = setup_file(OpenFlags::new().write(true), b"ab");
        file.seek(SeekFrom::Start(isize::MAX as u64)).unwrap();
        let err = file.write(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfMemory);
        assert_eq!(utils::lock(&file.node).content(), b"ab");
    }

    #[test]
    fn test_read_past_end_is_empty() {
        let mut file = setup_file(OpenFlags::read_only(), b"ab");
        file.seek(SeekFrom::Start(u64::MAX)).unwrap();
        assert_eq!(file.read(&mut [0u8; 4]).unwrap(), 0);
    }

    #[test]
    fn test_read_only_rejects_write() {
        let mut file = setup_file(OpenFlags::read_only(), b"");
        let err = file.write(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_write_only_rejects_read() {
        let mut file = setup_file(OpenFlags::new().write(true), b"data");
        let err = file.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_seek_before_start_fails() {
        let mut file = setup_file(OpenFlags::read_only(), b"data");
        let err = file.seek(SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(file.seek(SeekFrom::End(-1)).unwrap(), 3);
    }
}
