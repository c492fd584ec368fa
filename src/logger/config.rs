//! Konfigurasi log driver per container
//!
//! Pemilihan backend (none / json-file / syslog) dan metadata container yang
//! diteruskan ke backend saat dibuat.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use super::LoggerError;

/// Nama daemon default di [`LoggerInfo`]
pub const DEFAULT_DAEMON_NAME: &str = "containerio";

/// Nama file log untuk driver json-file
const JSON_LOG_FILE: &str = "json.log";

/// Log driver yang didukung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogDriver {
    /// Output container dibuang
    #[default]
    None,
    /// Satu file JSON per container
    JsonFile,
    /// Dikirim ke syslog
    Syslog,
}

impl LogDriver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::JsonFile => "json-file",
            Self::Syslog => "syslog",
        }
    }

    /// Parse nama driver, fallback ke `None` dengan warning jika tidak dikenal
    pub fn parse_or_none(name: &str) -> Self {
        name.parse().unwrap_or_else(|err| {
            warn!("{}, container output will not be logged", err);
            Self::None
        })
    }
}

impl FromStr for LogDriver {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(Self::None),
            "json-file" => Ok(Self::JsonFile),
            "syslog" => Ok(Self::Syslog),
            other => Err(LoggerError::UnsupportedDriver(other.to_string())),
        }
    }
}

impl fmt::Display for LogDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log config dari host config container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub driver: LogDriver,
    pub opts: HashMap<String, String>,
}

impl LogConfig {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(driver: LogDriver) -> Self {
        Self {
            driver,
            opts: HashMap::new(),
        }
    }

    /// Tambah satu opsi driver (builder style)
    pub fn with_opt(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.driver != LogDriver::None
    }
}

/// Metadata container untuk membangun log backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggerInfo {
    /// Opsi driver. Kosong kalau driver = none.
    pub log_config: HashMap<String, String>,
    pub container_id: String,
    pub container_name: String,
    pub container_image_id: String,
    pub container_labels: HashMap<String, String>,
    pub container_envs: Vec<String>,
    pub container_root_dir: PathBuf,
    pub daemon_name: String,
}

/// Subset data container yang dibutuhkan logger
#[derive(Debug, Clone, Copy)]
pub struct ContainerMeta<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub image: &'a str,
    pub labels: &'a HashMap<String, String>,
    pub envs: &'a [String],
}

impl LoggerInfo {
    /// Bangun `LoggerInfo` dari metadata container.
    ///
    /// `root_dir` adalah direktori metadata container di store daemon.
    pub fn from_container(meta: ContainerMeta<'_>, config: &LogConfig, root_dir: &Path) -> Self {
        let log_config = if config.is_enabled() {
            config.opts.clone()
        } else {
            HashMap::new()
        };

        Self {
            log_config,
            container_id: meta.id.to_string(),
            container_name: meta.name.to_string(),
            container_image_id: meta.image.to_string(),
            container_labels: meta.labels.clone(),
            container_envs: meta.envs.to_vec(),
            container_root_dir: root_dir.to_path_buf(),
            daemon_name: DEFAULT_DAEMON_NAME.to_string(),
        }
    }

    /// Nama container tanpa prefix `/`
    pub fn name(&self) -> &str {
        self.container_name.trim_start_matches('/')
    }
}

/// Path file log container, hanya untuk driver json-file.
///
/// Layout: `<home>/containers/<id>/json.log`
pub fn log_path(home_dir: &Path, container_id: &str, config: &LogConfig) -> Option<PathBuf> {
    match config.driver {
        LogDriver::JsonFile => Some(
            home_dir
                .join("containers")
                .join(container_id)
                .join(JSON_LOG_FILE),
        ),
        LogDriver::None | LogDriver::Syslog => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_parse() {
        assert_eq!("json-file".parse::<LogDriver>().unwrap(), LogDriver::JsonFile);
        assert_eq!("syslog".parse::<LogDriver>().unwrap(), LogDriver::Syslog);
        assert_eq!("none".parse::<LogDriver>().unwrap(), LogDriver::None);
        assert_eq!(
            "fluentd".parse::<LogDriver>(),
            Err(LoggerError::UnsupportedDriver("fluentd".to_string()))
        );
        assert_eq!(LogDriver::parse_or_none("gelf"), LogDriver::None);
    }

    #[test]
    fn test_driver_display_matches_parse() {
        for driver in [LogDriver::None, LogDriver::JsonFile, LogDriver::Syslog] {
            assert_eq!(driver.to_string().parse::<LogDriver>().unwrap(), driver);
        }
    }

    #[test]
    fn test_log_path_only_for_json_file() {
        let home = Path::new("/var/lib/containerio");
        let id = "5804ee42e505";

        assert_eq!(
            log_path(home, id, &LogConfig::new(LogDriver::JsonFile)),
            Some(PathBuf::from("/var/lib/containerio/containers/5804ee42e505/json.log"))
        );
        assert_eq!(log_path(home, id, &LogConfig::new(LogDriver::Syslog)), None);
        assert_eq!(log_path(home, id, &LogConfig::none()), None);
    }

    #[test]
    fn test_logger_info_drops_opts_when_disabled() {
        let labels = HashMap::from([("app".to_string(), "web".to_string())]);
        let envs = vec!["PATH=/usr/bin".to_string()];
        let meta = ContainerMeta {
            id: "abc",
            name: "/web-1",
            image: "sha256:1234",
            labels: &labels,
            envs: &envs,
        };
        let root = Path::new("/var/lib/containerio/containers/abc");

        let mut config = LogConfig::none().with_opt("max-size", "10m");
        let info = LoggerInfo::from_container(meta, &config, root);
        assert!(info.log_config.is_empty());
        assert_eq!(info.name(), "web-1");
        assert_eq!(info.daemon_name, DEFAULT_DAEMON_NAME);

        config.driver = LogDriver::JsonFile;
        let info = LoggerInfo::from_container(meta, &config, root);
        assert_eq!(info.log_config.get("max-size").map(String::as_str), Some("10m"));
        assert_eq!(info.container_labels, labels);
        assert_eq!(info.container_envs, envs);
        assert_eq!(info.container_root_dir, root);
    }
}
