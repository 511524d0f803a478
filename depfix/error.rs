use std::{path::PathBuf, sync::Arc};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] Arc<std::io::Error>),
    #[error("{} is not valid UTF-8", .0.display())]
    InvalidUtf8(PathBuf),
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml_edit::de::Error,
    },
    #[error("invalid base_dir: {0}")]
    NotAbsolute(#[from] depfix_fs::NotAbsolute),
}
