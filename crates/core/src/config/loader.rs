use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variables with this prefix override file values.
/// Nested keys use `__`, e.g. `INCIDENT_EVAL_BASELINE__CONCURRENCY=4`.
pub const CONFIG_ENV_PREFIX: &str = "INCIDENT_EVAL_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[llm]
provider = "ollama"

[baseline]
concurrency = 3
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.baseline.concurrency, 3);
    }

    #[test]
    fn test_load_config_from_str_bad_policy() {
        let toml = r#"
[baseline]
selection = { kind = "random", count = 3 }
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/incident-eval.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[generation]
batch_size = 8
min_high_ambiguity = 2

[baseline]
output_path = "runs/out.json"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.generation.batch_size, 8);
        assert_eq!(config.generation.min_high_ambiguity, 2);
        assert_eq!(config.baseline.output_path.to_str(), Some("runs/out.json"));
    }
}
