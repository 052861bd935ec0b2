use crate::config::types::{
    CheckpointConfig, ClassifierConfig, Config, CrawlerConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_checkpoint_config(&config.checkpoint)?;
    validate_classifier_config(&config.classifier)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            config.seed_url
        )));
    }

    if config.destination.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "destination cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    if config.download_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "download_timeout must be >= 1s, got {}s",
            config.download_timeout
        )));
    }

    validate_asset_extension(&config.asset_extension)?;

    Ok(())
}

/// Validates the asset extension: a bare extension such as "pdf"
fn validate_asset_extension(extension: &str) -> Result<(), ConfigError> {
    if extension.is_empty() {
        return Err(ConfigError::Validation(
            "asset_extension cannot be empty".to_string(),
        ));
    }

    if !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "asset_extension must be alphanumeric without a leading dot, got '{}'",
            extension
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the checkpoint record locations
fn validate_checkpoint_config(config: &CheckpointConfig) -> Result<(), ConfigError> {
    if config.queue_path.as_os_str().is_empty() || config.seen_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint paths cannot be empty".to_string(),
        ));
    }

    if config.queue_path == config.seen_path {
        return Err(ConfigError::Validation(format!(
            "queue_path and seen_path must differ, both are '{}'",
            config.queue_path.display()
        )));
    }

    Ok(())
}

/// Validates classifier markers and selectors
fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if config.container_markers.iter().all(|m| m.is_empty()) {
        return Err(ConfigError::Validation(
            "at least one non-empty container marker is required".to_string(),
        ));
    }

    if config.asset_markers.iter().all(|m| m.is_empty()) {
        return Err(ConfigError::Validation(
            "at least one non-empty asset marker is required".to_string(),
        ));
    }

    for selector in [
        &config.child_block_selector,
        &config.child_link_selector,
        &config.pagination_selector,
        &config.download_selector,
    ] {
        parse_selector(selector)?;
    }

    Ok(())
}

/// Parses a CSS selector, mapping failures to a config error
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
