use crate::domain::DEFAULT_MAX_COUNT;
use crate::error::RepeatrError;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Program used to launch the target, resolved on PATH
    pub runtime: String,
    /// Task artifact passed to the runtime
    pub target: PathBuf,
    /// Failure log, truncated at the start of every batch
    pub failure_log: PathBuf,
    /// Largest accepted run count
    pub max_count: u32,
    /// Pause between runs
    pub delay_ms: u64,
    /// Per-run timeout; none means a run may take as long as it likes
    pub timeout_ms: Option<u64>,
    /// Exit nonzero when any run failed
    pub strict_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            runtime: "python3".to_string(),
            target: PathBuf::from("workflow.py"),
            failure_log: PathBuf::from("failures.log"),
            max_count: DEFAULT_MAX_COUNT,
            delay_ms: 1000,
            timeout_ms: None,
            strict_exit: false,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        Self::load_first_existing(&Self::default_locations())
    }

    /// ~/.config/<project>/<project>.yml, then ./<project>.yml
    pub fn default_locations() -> Vec<PathBuf> {
        let project_name = env!("CARGO_PKG_NAME");
        let file_name = format!("{}.yml", project_name);

        let mut locations = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join(project_name).join(&file_name));
        }
        locations.push(PathBuf::from(file_name));
        locations
    }

    /// Load the first candidate that exists.
    ///
    /// A file that exists but cannot be loaded is an error; defaults are only
    /// used when no candidate exists at all.
    pub fn load_first_existing(candidates: &[PathBuf]) -> Result<Self> {
        for path in candidates {
            if path.exists() {
                return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// YAML rendering of the effective config, shown in verbose mode
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values no batch could run with
    pub fn validate(&self) -> std::result::Result<(), RepeatrError> {
        if self.max_count == 0 {
            return Err(RepeatrError::Config("max_count must be at least 1".to_string()));
        }
        if self.runtime.trim().is_empty() {
            return Err(RepeatrError::Config("runtime must not be empty".to_string()));
        }
        if self.timeout_ms == Some(0) {
            return Err(RepeatrError::Config("timeout_ms must be positive when set".to_string()));
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.runtime, "python3");
        assert_eq!(config.target, PathBuf::from("workflow.py"));
        assert_eq!(config.max_count, 100);
        assert_eq!(config.delay(), Duration::from_secs(1));
        assert_eq!(config.timeout(), None);
        assert!(!config.strict_exit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "runtime: bash\ntarget: task.sh\ntimeout_ms: 5000").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.runtime, "bash");
        assert_eq!(config.target, PathBuf::from("task.sh"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.max_count, 100);
        assert_eq!(config.failure_log, PathBuf::from("failures.log"));
    }

    #[test]
    fn test_load_rejects_zero_max_count() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_count: 0").unwrap();
        assert!(Config::load(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "delay_ms: [not, a, number]").unwrap();
        assert!(Config::load(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("primary.yml");
        let fallback = dir.path().join("fallback.yml");
        fs::write(&fallback, "runtime: bash\n").unwrap();

        let config = Config::load_first_existing(&[primary.clone(), fallback.clone()]).unwrap();
        assert_eq!(config.runtime, "bash");

        fs::write(&primary, "runtime: zsh\n").unwrap();
        let config = Config::load_first_existing(&[primary, fallback]).unwrap();
        assert_eq!(config.runtime, "zsh");
    }

    #[test]
    fn test_broken_discovered_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("repeatr.yml");
        let fallback = dir.path().join("fallback.yml");
        fs::write(&primary, "runtime: sh\nmax_count: 0\n").unwrap();
        fs::write(&fallback, "runtime: bash\n").unwrap();

        let err = Config::load_first_existing(&[primary, fallback]).unwrap_err();
        assert!(format!("{:#}", err).contains("max_count must be at least 1"));
    }

    #[test]
    fn test_no_candidates_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_first_existing(&[dir.path().join("missing.yml")]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_default_locations_end_with_local_file() {
        let locations = Config::default_locations();
        assert_eq!(locations.last(), Some(&PathBuf::from("repeatr.yml")));
    }

    #[test]
    fn test_to_yaml_reloads_to_same_config() {
        let config = Config {
            runtime: "bash".to_string(),
            timeout_ms: Some(1500),
            ..Config::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("runtime: bash"));
        let reloaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let missing = PathBuf::from("/nonexistent/repeatr.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            timeout_ms: Some(0),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(RepeatrError::Config(_))));
    }
}
