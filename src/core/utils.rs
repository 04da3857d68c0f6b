//! Small path and error helpers shared by the scoped handle and the backends.

use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lexically normalizes `path`: drops `.` segments, folds `..` into the preceding segment
/// and removes trailing separators. Nothing is looked up on any filesystem.
///
/// A `..` above the root stays at the root. A `..` at the start of a relative path is kept.
///
/// ```
/// use std::path::PathBuf;
/// use scoped_vfs::utils::normalize;
///
/// assert_eq!(normalize("/a/b/../c/"), PathBuf::from("/a/c"));
/// assert_eq!(normalize("/../.."), PathBuf::from("/"));
/// assert_eq!(normalize("../a/./b"), PathBuf::from("../a/b"));
/// ```
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.as_ref().components() {
        match component {
            Component::Prefix(_) | Component::RootDir => result.push(component),
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::ParentDir) | None => result.push(".."),
                // root (or drive prefix) absorbs it
                Some(_) => {}
            },
            Component::Normal(name) => result.push(name),
        }
    }
    result
}

/// Returns true if `path` is a bare filesystem root (`/`, or `C:\` on Windows).
pub fn is_root<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    path.has_root() && path.parent().is_none()
}

/// Kind of the `io::Error` wrapped by `err`, if it wraps one.
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.downcast_ref::<io::Error>().map(io::Error::kind)
}

/// Returns true if `err` wraps an `io::Error` of kind `NotFound`.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    error_kind(err) == Some(ErrorKind::NotFound)
}

/// Final segment of `path` as a string. The root reports itself.
pub(crate) fn entry_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn io_error(kind: ErrorKind, message: String) -> anyhow::Error {
    io::Error::new(kind, message).into()
}

pub(crate) fn not_found(path: &Path) -> anyhow::Error {
    io_error(ErrorKind::NotFound, format!("{} does not exist", path.display()))
}

pub(crate) fn already_exists(path: &Path) -> anyhow::Error {
    io_error(
        ErrorKind::AlreadyExists,
        format!("{} already exists", path.display()),
    )
}

pub(crate) fn not_a_directory(path: &Path) -> anyhow::Error {
    io_error(
        ErrorKind::NotADirectory,
        format!("{} is not a directory", path.display()),
    )
}

pub(crate) fn is_a_directory(path: &Path) -> anyhow::Error {
    io_error(
        ErrorKind::IsADirectory,
        format!("{} is a directory", path.display()),
    )
}

pub(crate) fn directory_not_empty(path: &Path) -> anyhow::Error {
    io_error(
        ErrorKind::DirectoryNotEmpty,
        format!("{} is not empty", path.display()),
    )
}

pub(crate) fn invalid_input(message: String) -> anyhow::Error {
    io_error(ErrorKind::InvalidInput, message)
}
