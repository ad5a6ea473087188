//! Type-check mode resolution.
//!
//! The effective mode comes from, in order of precedence: the CLI override,
//! the `QUILL_TYPE_CHECK` environment variable, the `type_checking.mode` key
//! of the project's `quill.json`, and finally [`TypeCheckMode::Off`].
//!
//! A [`TypeConfig`] is a plain value. The evaluator owns one and consults it
//! at every call boundary. The process-wide copy behind [`global`] exists for
//! the command-line driver only.

use super::glob::ExcludePattern;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

pub const TYPE_CHECK_ENV_VAR: &str = "QUILL_TYPE_CHECK";
pub const CONFIG_FILE_NAME: &str = "quill.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCheckMode {
    /// No checking at all.
    #[default]
    Off,
    /// Mismatches abort the call.
    On,
    /// Mismatches are reported and execution continues.
    Warn,
}

impl FromStr for TypeCheckMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(TypeCheckMode::Off),
            "on" => Ok(TypeCheckMode::On),
            "warn" => Ok(TypeCheckMode::Warn),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for TypeCheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCheckMode::Off => write!(f, "off"),
            TypeCheckMode::On => write!(f, "on"),
            TypeCheckMode::Warn => write!(f, "warn"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid type-check mode '{0}' (expected off, on or warn)")]
    InvalidMode(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the effective mode came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSource {
    Cli,
    Environment,
    ConfigFile,
    Default,
}

/// On-disk shape of `quill.json`.
#[derive(Debug, Default, Deserialize)]
struct ProjectConfig {
    #[serde(default)]
    type_checking: Option<TypeCheckingSection>,
}

#[derive(Debug, Default, Deserialize)]
struct TypeCheckingSection {
    #[serde(default)]
    mode: Option<TypeCheckMode>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeConfig {
    cli_mode: Option<TypeCheckMode>,
    env_mode: Option<TypeCheckMode>,
    config_mode: Option<TypeCheckMode>,
    exclude: Vec<ExcludePattern>,
    current_file: Option<PathBuf>,
    // Resolved once when the file is set; exclusion matching never touches
    // the filesystem or the working directory again.
    current_file_absolute: Option<PathBuf>,
}

impl TypeConfig {
    /// A configuration with no sources at all: checking is off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the environment variable and `quill.json` from the working
    /// directory.
    pub fn load() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::load_from_dir(&dir),
            Err(e) => {
                log::debug!("cannot determine working directory: {}", e);
                Self::from_sources(std::env::var(TYPE_CHECK_ENV_VAR).ok().as_deref(), None)
            }
        }
    }

    /// Reads the environment variable and `<dir>/quill.json`.
    pub fn load_from_dir(dir: &Path) -> Self {
        let env_value = std::env::var(TYPE_CHECK_ENV_VAR).ok();
        Self::from_sources(env_value.as_deref(), Some(&dir.join(CONFIG_FILE_NAME)))
    }

    /// Builds a configuration from an environment value and a config path.
    ///
    /// Unrecognized environment values and unreadable or malformed config
    /// files are ignored, leaving the next source in line to decide.
    pub fn from_sources(env_value: Option<&str>, config_path: Option<&Path>) -> Self {
        let mut config = Self::new();

        if let Some(raw) = env_value {
            match raw.parse::<TypeCheckMode>() {
                Ok(mode) => config.env_mode = Some(mode),
                Err(e) => log::debug!("ignoring {}: {}", TYPE_CHECK_ENV_VAR, e),
            }
        }

        if let Some(path) = config_path {
            match read_project_config(path) {
                Ok(Some(section)) => {
                    config.config_mode = section.mode;
                    config.exclude = section
                        .exclude
                        .iter()
                        .map(|p| ExcludePattern::new(p))
                        .collect();
                }
                Ok(None) => {}
                Err(e) => log::debug!("ignoring project config: {}", e),
            }
        }

        config
    }

    pub fn with_env_mode(mut self, mode: TypeCheckMode) -> Self {
        self.env_mode = Some(mode);
        self
    }

    pub fn with_config_mode(mut self, mode: TypeCheckMode) -> Self {
        self.config_mode = Some(mode);
        self
    }

    pub fn with_cli_override(mut self, mode: TypeCheckMode) -> Self {
        self.cli_mode = Some(mode);
        self
    }

    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.exclude.push(ExcludePattern::new(pattern));
        self
    }

    pub fn with_current_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.set_current_file(path);
        self
    }

    /// Sets or clears the CLI override. Call before execution starts.
    pub fn set_cli_override(&mut self, mode: Option<TypeCheckMode>) {
        self.cli_mode = mode;
    }

    pub fn set_current_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.current_file_absolute = Some(absolute_path(&path));
        self.current_file = Some(path);
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn exclude_patterns(&self) -> impl Iterator<Item = &str> {
        self.exclude.iter().map(|p| p.as_str())
    }

    pub fn effective_mode(&self) -> TypeCheckMode {
        self.resolve().0
    }

    pub fn mode_source(&self) -> ModeSource {
        self.resolve().1
    }

    fn resolve(&self) -> (TypeCheckMode, ModeSource) {
        if let Some(mode) = self.cli_mode {
            (mode, ModeSource::Cli)
        } else if let Some(mode) = self.env_mode {
            (mode, ModeSource::Environment)
        } else if let Some(mode) = self.config_mode {
            (mode, ModeSource::ConfigFile)
        } else {
            (TypeCheckMode::Off, ModeSource::Default)
        }
    }

    /// Whether the current file matches an exclude pattern, by absolute path
    /// or by bare file name.
    pub fn is_excluded(&self) -> bool {
        let (Some(file), Some(absolute)) =
            (self.current_file.as_deref(), self.current_file_absolute.as_deref())
        else {
            return false;
        };
        if self.exclude.is_empty() {
            return false;
        }

        let absolute = absolute.to_string_lossy();
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.exclude
            .iter()
            .any(|p| p.matches(&absolute) || (!file_name.is_empty() && p.matches(&file_name)))
    }

    pub fn should_check_types(&self) -> bool {
        matches!(self.effective_mode(), TypeCheckMode::On | TypeCheckMode::Warn)
            && !self.is_excluded()
    }

    pub fn should_exit_with_error(&self) -> bool {
        self.effective_mode() == TypeCheckMode::On
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// `Ok(None)` when the file does not exist or has no `type_checking` section.
fn read_project_config(path: &Path) -> Result<Option<TypeCheckingSection>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let parsed: ProjectConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parsed.type_checking)
}

lazy_static! {
    static ref GLOBAL_TYPE_CONFIG: RwLock<TypeConfig> = RwLock::new(TypeConfig::default());
}

/// Snapshot of the process-wide configuration.
pub fn global() -> TypeConfig {
    GLOBAL_TYPE_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide configuration. Meant to be called once, by the
/// driver, before any evaluation.
pub fn install_global(config: TypeConfig) {
    *GLOBAL_TYPE_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner) = config;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mode_parsing_is_case_insensitive() {
        assert_eq!("ON".parse::<TypeCheckMode>().unwrap(), TypeCheckMode::On);
        assert_eq!(" Warn ".parse::<TypeCheckMode>().unwrap(), TypeCheckMode::Warn);
        assert_eq!("off".parse::<TypeCheckMode>().unwrap(), TypeCheckMode::Off);
        assert!("strict".parse::<TypeCheckMode>().is_err());
    }

    #[test]
    fn test_default_is_off() {
        let config = TypeConfig::new();
        assert_eq!(config.effective_mode(), TypeCheckMode::Off);
        assert_eq!(config.mode_source(), ModeSource::Default);
        assert!(!config.should_check_types());
    }

    #[test]
    fn test_environment_beats_config_file() {
        let config = TypeConfig::new()
            .with_config_mode(TypeCheckMode::Warn)
            .with_env_mode(TypeCheckMode::On);
        assert_eq!(config.effective_mode(), TypeCheckMode::On);
        assert_eq!(config.mode_source(), ModeSource::Environment);
    }

    #[test]
    fn test_cli_override_beats_everything() {
        let mut config = TypeConfig::new()
            .with_config_mode(TypeCheckMode::On)
            .with_env_mode(TypeCheckMode::Warn);
        config.set_cli_override(Some(TypeCheckMode::Off));
        assert_eq!(config.effective_mode(), TypeCheckMode::Off);
        assert_eq!(config.mode_source(), ModeSource::Cli);

        config.set_cli_override(None);
        assert_eq!(config.effective_mode(), TypeCheckMode::Warn);
    }

    #[test]
    fn test_invalid_env_value_falls_through() {
        let config = TypeConfig::from_sources(Some("loud"), None);
        assert_eq!(config.mode_source(), ModeSource::Default);
    }

    #[test]
    fn test_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"type_checking": {{"mode": "warn", "exclude": ["*_gen.ql"]}}}}"#
        )
        .unwrap();

        let config = TypeConfig::from_sources(None, Some(&path));
        assert_eq!(config.effective_mode(), TypeCheckMode::Warn);
        assert_eq!(config.mode_source(), ModeSource::ConfigFile);
        assert_eq!(config.exclude_patterns().collect::<Vec<_>>(), vec!["*_gen.ql"]);
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let config = TypeConfig::from_sources(Some("warn"), Some(&path));
        assert_eq!(config.effective_mode(), TypeCheckMode::Warn);
        assert_eq!(config.exclude_patterns().count(), 0);

        let config = TypeConfig::from_sources(None, Some(&path));
        assert_eq!(config.effective_mode(), TypeCheckMode::Off);
    }

    #[test]
    fn test_missing_config_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = TypeConfig::from_sources(None, Some(&dir.path().join(CONFIG_FILE_NAME)));
        assert_eq!(config, TypeConfig::new());
    }

    #[test]
    fn test_should_exit_with_error_only_for_on() {
        assert!(TypeConfig::new()
            .with_env_mode(TypeCheckMode::On)
            .should_exit_with_error());
        assert!(!TypeConfig::new()
            .with_env_mode(TypeCheckMode::Warn)
            .should_exit_with_error());
        assert!(!TypeConfig::new().should_exit_with_error());
    }

    #[test]
    fn test_no_current_file_is_never_excluded() {
        let config = TypeConfig::new()
            .with_env_mode(TypeCheckMode::On)
            .with_exclude("*");
        assert!(!config.is_excluded());
        assert!(config.should_check_types());
    }

    #[test]
    fn test_relative_file_is_resolved_when_set() {
        let config = TypeConfig::new()
            .with_env_mode(TypeCheckMode::On)
            .with_current_file("script.ql");
        let expected = std::env::current_dir().unwrap().join("script.ql");
        assert_eq!(config.current_file(), Some(Path::new("script.ql")));
        assert_eq!(config.current_file_absolute.as_deref(), Some(expected.as_path()));
    }
}
