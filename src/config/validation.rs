use crate::config::types::{Config, CrawlerSettings, LlmConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_llm_config(&config.llm)?;
    validate_crawler_settings(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the LLM backend configuration
fn validate_llm_config(config: &LlmConfig) -> Result<(), ConfigError> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation(
            "port must be non-zero".to_string(),
        ));
    }

    if config.embedding_model.is_empty() {
        return Err(ConfigError::Validation(
            "embedding-model cannot be empty".to_string(),
        ));
    }

    if config.generation_model.is_empty() {
        return Err(ConfigError::Validation(
            "generation-model cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler settings
fn validate_crawler_settings(config: &CrawlerSettings) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Url::parse(&config.webdriver_url).map_err(|e| {
        ConfigError::Validation(format!(
            "webdriver-url is not a valid URL ({}): {}",
            config.webdriver_url, e
        ))
    })?;

    // Basic auth credentials must come as a pair
    match (&config.basic_auth_username, &config.basic_auth_password) {
        (Some(_), None) | (None, Some(_)) => {
            return Err(ConfigError::Validation(
                "basic-auth-username and basic-auth-password must be set together".to_string(),
            ));
        }
        _ => {}
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root_path.is_empty() {
        return Err(ConfigError::Validation(
            "root-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
