use std::path::{Path, PathBuf};

use depfix_fs::Absolute;

use crate::Error;

/// Abstract interface to the file system and OS.
///
/// Reading and writing depfiles, and reading configuration from the
/// environment, all go through this, so that the normalization step can be
/// tested without touching the disk.
pub trait Io: Send + Sync {
    /// Read a file from the filesystem.
    fn read_file(&self, path: &Absolute<Path>) -> Result<Vec<u8>, std::io::Error>;

    /// Write a file to the filesystem, replacing its contents.
    fn write_file(&self, path: &Absolute<Path>, data: &[u8]) -> Result<(), std::io::Error>;

    /// Read environment variable.
    fn read_env(&self, name: &str) -> Option<String>;

    /// The directory the compiler was invoked from.
    fn current_dir(&self) -> Result<Absolute<PathBuf>, std::io::Error>;
}

/// Read a depfile as text.
pub fn read_depfile(io: &dyn Io, path: &Absolute<Path>) -> Result<String, Error> {
    let data = io.read_file(path)?;
    String::from_utf8(data).map_err(|_| Error::InvalidUtf8(path.to_path_buf()))
}

#[derive(Default)]
pub struct RealSystem(());

impl RealSystem {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Io for RealSystem {
    fn read_file(&self, path: &Absolute<Path>) -> Result<Vec<u8>, std::io::Error> {
        std::fs::read(path)
    }

    fn write_file(&self, path: &Absolute<Path>, data: &[u8]) -> Result<(), std::io::Error> {
        std::fs::write(path, data)
    }

    fn read_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn current_dir(&self) -> Result<Absolute<PathBuf>, std::io::Error> {
        // `current_dir()` is always absolute.
        std::env::current_dir().map(Absolute::new_unchecked)
    }
}
