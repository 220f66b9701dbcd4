use std::path::PathBuf;

use crate::os_release::OS_RELEASE_BASENAME;

/// Environment variable overriding the configuration directory.
pub const UNIXCONFDIR_ENV: &str = "UNIXCONFDIR";

const DEFAULT_UNIXCONFDIR: &str = "/etc";

/// Where to look for distribution information and which sources to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub unix_conf_dir: PathBuf,
    pub os_release_file: Option<PathBuf>,
    pub distro_release_file: Option<PathBuf>,
    pub include_lsb: bool,
    pub include_uname: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unix_conf_dir: PathBuf::from(DEFAULT_UNIXCONFDIR),
            os_release_file: None,
            distro_release_file: None,
            include_lsb: true,
            include_uname: true,
        }
    }
}

impl Config {
    /// Default configuration, with the directory taken from `UNIXCONFDIR`
    /// when it is set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(UNIXCONFDIR_ENV).filter(|d| !d.is_empty()) {
            config.unix_conf_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_unix_conf_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.unix_conf_dir = dir.into();
        self
    }

    pub fn with_os_release_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.os_release_file = Some(path.into());
        self
    }

    pub fn with_distro_release_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.distro_release_file = Some(path.into());
        self
    }

    pub fn include_lsb(mut self, include: bool) -> Self {
        self.include_lsb = include;
        self
    }

    pub fn include_uname(mut self, include: bool) -> Self {
        self.include_uname = include;
        self
    }

    /// The os-release file to read: the explicit override, or
    /// `<unix_conf_dir>/os-release`.
    pub fn os_release_path(&self) -> PathBuf {
        match &self.os_release_file {
            Some(path) => path.clone(),
            None => self.unix_conf_dir.join(OS_RELEASE_BASENAME),
        }
    }
}
