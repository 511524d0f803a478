use std::borrow::Cow;

use crate::{Absolute, absolute::has_drive_prefix};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("not an absolute path: \"{0}\"")]
pub struct NotAbsolute(pub String);

/// Everything needed to turn an absolute path into a relative one.
///
/// Only paths under `base_dir` are made relative, and they are made relative
/// to `cwd`, the directory the compiler was invoked from. An empty `base_dir`
/// disables relative paths entirely.
#[derive(Debug, Clone, Copy)]
pub struct RelativePathContext<'a> {
    pub base_dir: &'a str,
    pub cwd: &'a Absolute<str>,
}

impl<'a> RelativePathContext<'a> {
    #[inline]
    #[must_use]
    pub fn new(base_dir: &'a str, cwd: &'a Absolute<str>) -> Self {
        Self { base_dir, cwd }
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.base_dir.is_empty()
    }
}

/// Make `path` relative to the context's working directory if it lies under
/// the base directory. Anything else is returned untouched.
///
/// This is purely lexical: symlinks are not resolved and the filesystem is not
/// accessed, so the result is the same on any machine with the same layout.
#[must_use]
pub fn make_relative_path<'p>(ctx: &RelativePathContext<'_>, path: &'p str) -> Cow<'p, str> {
    if !ctx.is_enabled() || !path_starts_with(path, ctx.base_dir) {
        return Cow::Borrowed(path);
    }
    Cow::Owned(relative_path(ctx.cwd, path))
}

#[inline]
fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

#[inline]
fn chars_eq(a: char, b: char) -> bool {
    if cfg!(windows) {
        (is_separator(a) && is_separator(b)) || a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}

#[inline]
fn components_eq(a: &str, b: &str) -> bool {
    if cfg!(windows) {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Does `path` start with the directory `prefix`?
///
/// The match must end on a component boundary, so `/foo/barbaz` does not start
/// with `/foo/bar`. On Windows, the comparison ignores ASCII case and treats
/// `/` and `\` as the same separator.
#[must_use]
pub fn path_starts_with(path: &str, prefix: &str) -> bool {
    if path.is_empty() || prefix.is_empty() {
        return false;
    }

    let mut path_chars = path.chars();
    for p in prefix.chars() {
        match path_chars.next() {
            Some(c) if chars_eq(c, p) => {}
            _ => return false,
        }
    }

    prefix.ends_with(is_separator) || path_chars.next().is_none_or(is_separator)
}

/// Split an absolute path into its root (`/` or a drive like `c:/`) and the
/// remainder.
fn split_root(path: &str) -> (&str, &str) {
    if cfg!(windows) && has_drive_prefix(path) {
        path.split_at(3)
    } else if path.starts_with('/') {
        path.split_at(1)
    } else {
        ("", path)
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(is_separator).filter(|c| !c.is_empty())
}

/// Lexically normalize an absolute path: duplicate separators and `.`
/// components are dropped, and `..` removes the previous component. Parents
/// of the root are the root itself.
#[must_use]
pub fn normalize_absolute_path(path: &str) -> String {
    let (root, rest) = split_root(path);

    let mut stack = Vec::new();
    for component in components(rest) {
        match component {
            "." => {}
            ".." => {
                stack.pop();
            }
            _ => stack.push(component),
        }
    }

    let mut normalized = String::with_capacity(path.len());
    normalized.push_str(root);
    for (i, component) in stack.iter().enumerate() {
        if i > 0 {
            normalized.push('/');
        }
        normalized.push_str(component);
    }
    normalized
}

/// Compute the path of `path` relative to the directory `dir`. Both must be
/// absolute. Returns `.` if they are the same directory.
///
/// On Windows, a path on a different drive than `dir` has no relative form and
/// is returned normalized but otherwise unchanged.
#[must_use]
pub fn relative_path(dir: &Absolute<str>, path: &str) -> String {
    let dir = normalize_absolute_path(dir);
    let path = normalize_absolute_path(path);

    let (dir_root, dir_rest) = split_root(&dir);
    let (path_root, path_rest) = split_root(&path);
    if !components_eq(dir_root, path_root) {
        return path;
    }

    let dir_components: Vec<&str> = components(dir_rest).collect();
    let path_components: Vec<&str> = components(path_rest).collect();
    let common = dir_components
        .iter()
        .zip(&path_components)
        .take_while(|(a, b)| components_eq(a, b))
        .count();

    let parts: Vec<&str> = std::iter::repeat_n("..", dir_components.len() - common)
        .chain(path_components[common..].iter().copied())
        .collect();

    if parts.is_empty() {
        String::from(".")
    } else {
        parts.join("/")
    }
}
