//! Filesystem handles that carry their own working directory.
//!
//! ### Overview
//!
//! `scoped-vfs` lets a program behave as if every filesystem handle had a private, shell-like
//! current working directory. Relative paths are resolved against that directory instead of the
//! process-wide one, then handed to a pluggable storage backend.
//!
//! **Key ideas**:
//! - **Abstraction**: Every backend implements the `FileStore` trait; `ScopedFs` wraps any of them.
//! - **No global state**: `chdir()` on one handle never affects another handle or the process.
//! - **Testability**: `MemStore` keeps everything in memory, `DirStore` confines itself to a host
//!   directory, so tests never touch the rest of the disk.
//! - **Executable lookup**: `ScopedFs::look_path()` scans a `PATH`-like list through the backend.
//!
//! ### Example
//!
//! ```
//! use scoped_vfs::{MemStore, ScopedFs};
//!
//! let store = MemStore::new();
//! let mut fs = ScopedFs::new("/home", &store).unwrap();
//!
//! fs.write_file("notes.txt", b"hello", 0o644).unwrap();
//! fs.chdir("..");
//! assert_eq!(fs.read_file("home/notes.txt").unwrap(), b"hello");
//! ```

mod core;
mod scoped;
mod vfs;

pub use crate::core::{FileStore, Metadata, OpenFlags, Result, utils};
pub use crate::scoped::{ScopedFs, resolve};
pub use crate::vfs::{DirStore, Entry, EntryType, MemFile, MemStore};
