use std::{borrow::Borrow, ops::Deref};

pub trait IsAbsolute {
    fn is_absolute(&self) -> bool;
    #[inline]
    fn is_relative(&self) -> bool {
        !self.is_absolute()
    }
}

/// Syntactic absolute path test for paths as they appear in depfiles.
///
/// A path is absolute if it starts with `/`. On Windows, drive-letter paths
/// like `c:/foo` or `c:\foo` are absolute as well. The filesystem is never
/// consulted.
#[must_use]
pub fn is_absolute_path(path: &str) -> bool {
    if cfg!(windows) && has_drive_prefix(path) {
        return true;
    }
    path.starts_with('/')
}

/// True if `path` starts with a drive letter, a colon and a separator.
#[inline]
pub(crate) fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[1] == b':' && matches!(bytes[2], b'/' | b'\\')
}

impl IsAbsolute for str {
    #[inline]
    fn is_absolute(&self) -> bool {
        is_absolute_path(self)
    }
}

impl IsAbsolute for String {
    #[inline]
    fn is_absolute(&self) -> bool {
        is_absolute_path(self)
    }
}

impl IsAbsolute for std::path::Path {
    #[inline]
    fn is_absolute(&self) -> bool {
        std::path::Path::is_absolute(self)
    }

    #[inline]
    fn is_relative(&self) -> bool {
        std::path::Path::is_relative(self)
    }
}

/// Toll-free wrapper marking that a path is absolute.
///
/// Works with both depfile path strings and `std` paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Absolute<P: ?Sized> {
    path: P,
}

impl<P: Sized> Absolute<P> {
    pub fn try_new(path: P) -> Result<Self, P>
    where
        P: IsAbsolute,
    {
        if path.is_absolute() {
            Ok(Absolute::new_unchecked(path))
        } else {
            Err(path)
        }
    }
}

impl<P: ?Sized> Absolute<P> {
    pub fn try_new_ref(path: &P) -> Option<&Absolute<P>>
    where
        P: IsAbsolute,
    {
        if path.is_absolute() {
            Some(Absolute::new_ref_unchecked(path))
        } else {
            None
        }
    }

    pub const fn new_ref_unchecked(path: &P) -> &Self {
        unsafe {
            // SAFETY: #[repr(transparent)]
            &*(path as *const P as *const Absolute<P>)
        }
    }

    pub const fn new_unchecked(path: P) -> Self
    where
        P: Sized,
    {
        Absolute { path }
    }

    pub fn as_deref(&self) -> &Absolute<P::Target>
    where
        P: Deref,
    {
        Absolute::new_ref_unchecked(self.path.deref())
    }
}

impl<P: ?Sized> Deref for Absolute<P> {
    type Target = P;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.path
    }
}

impl<P: ?Sized> Borrow<P> for Absolute<P> {
    #[inline]
    fn borrow(&self) -> &P {
        &self.path
    }
}

impl<P: ?Sized> AsRef<P> for Absolute<P> {
    #[inline]
    fn as_ref(&self) -> &P {
        &self.path
    }
}

impl AsRef<std::path::Path> for Absolute<std::path::PathBuf> {
    #[inline]
    fn as_ref(&self) -> &std::path::Path {
        self.path.as_ref()
    }
}

impl TryFrom<&str> for Absolute<String> {
    type Error = crate::NotAbsolute;

    #[inline]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Absolute::try_new(value.to_owned()).map_err(|_| crate::NotAbsolute(value.to_owned()))
    }
}

impl<P: PartialEq + ?Sized> PartialEq<P> for Absolute<P> {
    #[inline]
    fn eq(&self, other: &P) -> bool {
        self.path == *other
    }
}

impl PartialEq<&str> for Absolute<String> {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.path == *other
    }
}

impl<P: std::fmt::Display + ?Sized> std::fmt::Display for Absolute<P> {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.path.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_style_paths() {
        assert!(is_absolute_path("/"));
        assert!(is_absolute_path("/usr/include/stdio.h"));
        assert!(!is_absolute_path(""));
        assert!(!is_absolute_path("src/a.c"));
        assert!(!is_absolute_path("./a.c"));
        assert!(!is_absolute_path("out.o:"));
    }

    #[test]
    #[cfg(windows)]
    fn drive_letter_paths() {
        assert!(is_absolute_path("c:/foo"));
        assert!(is_absolute_path("C:\\foo"));
        assert!(!is_absolute_path("c:foo"));
        assert!(!is_absolute_path("c:"));
    }

    #[test]
    #[cfg(not(windows))]
    fn drive_letter_paths_are_relative_on_unix() {
        assert!(!is_absolute_path("c:/foo"));
        assert!(!is_absolute_path("C:\\foo"));
    }

    #[test]
    fn wrapper() {
        let abs = Absolute::try_new(String::from("/a/b")).unwrap();
        assert_eq!(abs, "/a/b");
        assert_eq!(abs.to_string(), "/a/b");
        assert!(Absolute::try_new(String::from("a/b")).is_err());
        assert!(Absolute::<str>::try_new_ref("/x").is_some());
        assert!(Absolute::<str>::try_new_ref("x").is_none());

        let err = Absolute::<String>::try_from("rel").unwrap_err();
        assert_eq!(err.to_string(), "not an absolute path: \"rel\"");
    }
}
