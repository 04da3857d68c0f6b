use std::path::{Component, Path, PathBuf};

use crate::core::utils;

/// Resolves `path` against the working directory `cwd` and returns a normalized absolute path.
/// No storage is touched.
///
/// * An absolute `path` is only normalized; `cwd` is ignored.
/// * A root-relative `path` (`/x` without a drive, or `\x` where the backslash is a separator)
///   is anchored at the root of the volume `cwd` lives on.
/// * Any other `path` is joined onto `cwd`.
/// * An empty `path` yields `cwd`.
///
/// `cwd` is expected to be absolute and normalized already.
///
/// ```
/// use std::path::PathBuf;
/// use scoped_vfs::resolve;
///
/// assert_eq!(resolve("sub/dir", "/home"), PathBuf::from("/home/sub/dir"));
/// assert_eq!(resolve("../sibling", "/home/me"), PathBuf::from("/home/sibling"));
/// assert_eq!(resolve("", "/home"), PathBuf::from("/home"));
/// ```
pub fn resolve<P: AsRef<Path>, W: AsRef<Path>>(path: P, cwd: W) -> PathBuf {
    let path = path.as_ref();
    let cwd = cwd.as_ref();

    let full = if path.is_absolute() {
        path.to_path_buf()
    } else if path.has_root() {
        volume_root(cwd).join(path)
    } else {
        cwd.join(path)
    };
    utils::normalize(full)
}

/// Leading prefix and root components of `cwd` (`/`, or `C:\` on Windows).
fn volume_root(cwd: &Path) -> PathBuf {
    cwd.components()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_empty() {
        assert_eq!(resolve("", "/home"), PathBuf::from("/home"));
        assert_eq!(resolve(".", "/home"), PathBuf::from("/home"));
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve("me", "/home"), PathBuf::from("/home/me"));
        assert_eq!(resolve("sub/dir", "/home"), PathBuf::from("/home/sub/dir"));
        assert_eq!(resolve("./sub//dir/", "/home"), PathBuf::from("/home/sub/dir"));
    }

    #[test]
    fn test_resolve_absolute_ignores_cwd() {
        assert_eq!(resolve("/tmp", "/home"), PathBuf::from("/tmp"));
        assert_eq!(resolve("/tmp/../etc/./x/", "/home"), PathBuf::from("/etc/x"));
    }

    #[test]
    fn test_resolve_parent_dirs() {
        assert_eq!(resolve("../sibling", "/home/me"), PathBuf::from("/home/sibling"));
        assert_eq!(resolve("..", "/home/me"), PathBuf::from("/home"));
        assert_eq!(resolve("../../../../..", "/home/me"), PathBuf::from("/"));
        assert_eq!(resolve("foo/./../bar", "/home/me"), PathBuf::from("/home/me/bar"));
    }

    #[test]
    fn test_resolve_from_root() {
        assert_eq!(resolve("", "/"), PathBuf::from("/"));
        assert_eq!(resolve("a", "/"), PathBuf::from("/a"));
        assert_eq!(resolve("..", "/"), PathBuf::from("/"));
    }

    #[test]
    fn test_resolve_relative_matches_join_then_normalize() {
        let cwd = Path::new("/current/working/dir");
        for p in ["a", "a/b", "./a", "../a", "a/../../b", "a/b/c/../../d"] {
            assert_eq!(resolve(p, cwd), utils::normalize(cwd.join(p)), "input: {p:?}");
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let cwd = Path::new("/home/me");
        for p in ["", "x", "/x/../y", "../../z", "a/./b/", "/"] {
            let once = resolve(p, cwd);
            assert_eq!(resolve(&once, cwd), once, "input: {p:?}");
        }
    }

    #[test]
    fn test_resolve_leading_backslash() {
        #[cfg(unix)]
        {
            // A backslash is an ordinary filename character here
            assert_eq!(resolve(r"\tmp", "/home"), PathBuf::from(r"/home/\tmp"));
        }
        #[cfg(windows)]
        {
            assert_eq!(resolve(r"\tmp", r"C:\home"), PathBuf::from(r"C:\tmp"));
            assert_eq!(resolve("/tmp", r"D:\home"), PathBuf::from(r"D:\tmp"));
        }
    }
}
