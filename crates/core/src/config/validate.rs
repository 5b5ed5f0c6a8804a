use super::{types::Config, ConfigError};

fn invalid(message: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(message.into()))
}

fn check_temperature(section: &str, temperature: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&temperature) {
        return invalid(format!(
            "{}.temperature must be between 0.0 and 2.0, got {}",
            section, temperature
        ));
    }
    Ok(())
}

/// Validate configuration
/// Currently validates:
/// - Retry attempts and temperatures are usable
/// - Generation minimums fit inside the batch
/// - Baseline concurrency and repeat count are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Model client
    if config.llm.retry.max_attempts == 0 {
        return invalid("llm.retry.max_attempts cannot be 0");
    }
    if config.llm.model.trim().is_empty() {
        return invalid("llm.model cannot be empty");
    }

    // Generation
    let generation = &config.generation;
    if generation.batch_size == 0 {
        return invalid("generation.batch_size cannot be 0");
    }
    check_temperature("generation", generation.temperature)?;
    if generation.categories.is_empty() {
        return invalid("generation.categories cannot be empty");
    }
    if generation.min_high_ambiguity > generation.batch_size {
        return invalid(format!(
            "generation.min_high_ambiguity ({}) exceeds batch_size ({})",
            generation.min_high_ambiguity, generation.batch_size
        ));
    }
    let per_category_total: usize = generation.min_per_category.values().sum();
    if per_category_total > generation.batch_size {
        return invalid(format!(
            "generation.min_per_category totals {} which exceeds batch_size ({})",
            per_category_total, generation.batch_size
        ));
    }
    if let Some(category) = generation
        .min_per_category
        .iter()
        .find(|(category, min)| **min > 0 && !generation.categories.contains(*category))
        .map(|(category, _)| category)
    {
        return invalid(format!(
            "generation.min_per_category requires \"{}\" which is not in generation.categories",
            category
        ));
    }

    // Baseline
    let baseline = &config.baseline;
    check_temperature("baseline", baseline.temperature)?;
    if baseline.concurrency == 0 {
        return invalid("baseline.concurrency cannot be 0");
    }
    if baseline.runs_per_repeated_ticket == 0 {
        return invalid("baseline.runs_per_repeated_ticket cannot be 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::RootCause;
    use std::collections::BTreeMap;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.generation.batch_size = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = Config::default();
        config.baseline.concurrency = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.baseline.runs_per_repeated_ticket = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.llm.retry.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_temperature_range() {
        let mut config = Config::default();
        config.baseline.temperature = 2.5;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("baseline.temperature"));

        let mut config = Config::default();
        config.generation.temperature = -0.1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_minimums_fit_batch() {
        let mut config = Config::default();
        config.generation.batch_size = 4;
        config.generation.min_high_ambiguity = 3;
        config.generation.min_per_category =
            BTreeMap::from([(RootCause::Unknown, 2), (RootCause::CodeRegression, 3)]);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("min_per_category totals 5"));

        config.generation.min_per_category = BTreeMap::new();
        config.generation.min_high_ambiguity = 5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_minimum_for_excluded_category() {
        let mut config = Config::default();
        config.generation.categories = vec![RootCause::CodeRegression];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Unknown / Insufficient Data"));
    }
}
