//! Application configuration.
//!
//! Aggregates configuration into a single Config struct that can be loaded
//! from YAML files or environment variables.

mod weaving;

pub use weaving::{
    BindingConfig, PointcutConfig, RuleConfig, WeavingConfig, ALL_SERVICES_BY_COMPONENT,
    BUSINESS_AND_DATA_PACKAGE, BUSINESS_PACKAGE, DATA_PACKAGE, TRACK_TIME_MARKER,
};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "JOINPOINT_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "JOINPOINT";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "JOINPOINT_LOG";

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pointcuts, bindings and advice failure policy.
    pub weaving: WeavingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    ///
    /// Sections absent from every source take the standard weaving setup.
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse configuration from a YAML document.
    ///
    /// Uses the same reader as [`Config::load`], so rules written as
    /// single-key maps (`{ within: "app::*" }`) parse the same way here.
    pub fn from_yaml(yaml: &str) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config as ConfigLib, File, FileFormat};

        ConfigLib::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    /// Create config for testing: no advice at all.
    pub fn for_test() -> Self {
        Self {
            weaving: WeavingConfig::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;

    use super::*;
    use crate::advice::{AdviceCatalog, AdviceFailurePolicy};

    #[test]
    fn test_config_default_is_standard() {
        let config = Config::default();
        assert_eq!(config.weaving.pointcuts.len(), 5);
        assert_eq!(config.weaving.bindings.len(), 5);
        assert_eq!(
            config.weaving.failure_policy,
            AdviceFailurePolicy::LogAndContinue
        );
    }

    #[test]
    fn test_config_for_test() {
        let config = Config::for_test();
        assert!(config.weaving.pointcuts.is_empty());
        assert!(config.weaving.bindings.is_empty());
    }

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(
            r#"
weaving:
  failure_policy: abort
  pointcuts:
    - name: everything
      rule: { within: "**" }
  bindings:
    - phase: before
      pointcut: everything
      advice: logging
"#,
        )
        .unwrap();
        assert_eq!(config.weaving.failure_policy, AdviceFailurePolicy::Abort);
        assert_eq!(config.weaving.pointcuts[0].name, "everything");
        assert_eq!(config.weaving.bindings[0].advice, "logging");
    }

    #[test]
    fn test_from_yaml_parses_shipped_example() {
        let config = Config::from_yaml(include_str!("../../joinpoint.example.yaml")).unwrap();
        assert_eq!(config.weaving.pointcuts.len(), 5);
        assert_eq!(config.weaving.bindings.len(), 5);
        assert_eq!(
            config.weaving.pointcuts[3].rule,
            RuleConfig::Component("*Service*".to_string())
        );
        assert_eq!(
            config.weaving.pointcuts[4].rule,
            RuleConfig::Marker("track_time".to_string())
        );

        let services = crate::assembly::assemble(&config, &AdviceCatalog::standard()).unwrap();
        assert_eq!(services.retrieve_data.advice_count(), 4);
        assert_eq!(services.calculate_max.advice_count(), 3);
    }

    #[test]
    fn test_missing_weaving_section_is_standard() {
        let config = Config::from_yaml("unrelated: true").unwrap();
        assert_eq!(config.weaving.pointcuts.len(), 5);
        assert_eq!(config.weaving.bindings.len(), 5);
    }

    #[test]
    #[serial]
    fn test_load_pointcuts_only_section_assembles() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"weaving:
  pointcuts:
    - name: everything
      rule: {{ within: "**" }}"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.weaving.pointcuts.len(), 1);
        assert!(config.weaving.bindings.is_empty());

        let services = crate::assembly::assemble(&config, &AdviceCatalog::standard()).unwrap();
        assert!(!services.retrieve_data.is_advised());
        assert_eq!(services.calculate_max.call(()), Ok(555));
    }

    #[test]
    #[serial]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"weaving:
  failure_policy: abort
  pointcuts:
    - name: repositories
      rule: {{ component: "*Repository" }}
  bindings:
    - phase: after_throwing
      pointcut: repositories
      advice: logging"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.weaving.failure_policy, AdviceFailurePolicy::Abort);
        assert_eq!(config.weaving.pointcuts.len(), 1);
        assert_eq!(
            config.weaving.pointcuts[0].rule,
            RuleConfig::Component("*Repository".to_string())
        );
        assert_eq!(config.weaving.bindings.len(), 1);
    }

    #[test]
    #[serial]
    fn test_load_missing_required_file() {
        assert!(Config::load(Some("/nonexistent/joinpoint.yaml")).is_err());
    }

    #[test]
    #[serial]
    fn test_load_env_overrides_policy() {
        std::env::set_var("JOINPOINT__WEAVING__FAILURE_POLICY", "abort");
        let config = Config::load(None);
        std::env::remove_var("JOINPOINT__WEAVING__FAILURE_POLICY");

        let config = config.unwrap();
        assert_eq!(config.weaving.failure_policy, AdviceFailurePolicy::Abort);
    }
}
