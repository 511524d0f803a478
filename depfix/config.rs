use std::path::Path;

use depfix_fs::{Absolute, NotAbsolute, RelativePathContext, is_absolute_path};

use crate::{ConfigError, Io};

/// Environment variable overriding `base_dir` from the config file.
pub const BASE_DIR_ENV: &str = "DEPFIX_BASEDIR";

/// Settings that control depfile normalization.
///
/// Read from a TOML file:
///
/// ```toml
/// base_dir = "/home/user/src"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Absolute paths under this directory are made relative. Empty disables
    /// relative paths.
    pub base_dir: String,
}

impl Config {
    pub fn from_toml(path: &Path, data: &[u8]) -> Result<Self, ConfigError> {
        let config: Config =
            toml_edit::de::from_slice(data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration: the config file if one is given, then the
    /// environment.
    pub fn load(io: &dyn Io, path: Option<&Absolute<Path>>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                tracing::debug!("Reading config file: {}", path.display());
                let data = io.read_file(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(path, &data)?
            }
            None => Config::default(),
        };

        if let Some(base_dir) = io.read_env(BASE_DIR_ENV) {
            tracing::debug!("{BASE_DIR_ENV} overrides base_dir: {base_dir}");
            config.set_base_dir(base_dir)?;
        }

        Ok(config)
    }

    pub fn set_base_dir(&mut self, base_dir: String) -> Result<(), ConfigError> {
        check_base_dir(&base_dir)?;
        self.base_dir = base_dir;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_base_dir(&self.base_dir)
    }

    #[inline]
    #[must_use]
    pub fn relative_path_context<'a>(&'a self, cwd: &'a Absolute<str>) -> RelativePathContext<'a> {
        RelativePathContext::new(&self.base_dir, cwd)
    }
}

fn check_base_dir(base_dir: &str) -> Result<(), ConfigError> {
    if base_dir.is_empty() || is_absolute_path(base_dir) {
        Ok(())
    } else {
        Err(NotAbsolute(base_dir.to_owned()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let config = Config::from_toml(Path::new("depfix.toml"), b"base_dir = \"/home/u\"\n");
        assert_eq!(
            config.unwrap(),
            Config {
                base_dir: String::from("/home/u")
            }
        );

        let config = Config::from_toml(Path::new("depfix.toml"), b"");
        assert_eq!(config.unwrap(), Config::default());
    }

    #[test]
    fn relative_base_dir() {
        let err = Config::from_toml(Path::new("depfix.toml"), b"base_dir = \"home/u\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotAbsolute(_)));
        assert_eq!(
            err.to_string(),
            "invalid base_dir: not an absolute path: \"home/u\""
        );

        let mut config = Config::default();
        assert!(config.set_base_dir(String::from("rel")).is_err());
        assert!(config.base_dir.is_empty());
        config.set_base_dir(String::new()).unwrap();
    }

    #[test]
    fn unknown_key() {
        let err = Config::from_toml(Path::new("depfix.toml"), b"basedir = \"/x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid config file depfix.toml"));
    }
}
