//! Semantic validation of parsed configuration

use crate::config::types::Config;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Checks invariants the TOML schema cannot express
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if config.retry.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "retry.max-attempts must be at least 1".to_string(),
        ));
    }
    if config.retry.delay_min_secs < 0.0 {
        return Err(ConfigError::Validation(
            "retry.delay-min-secs must not be negative".to_string(),
        ));
    }
    if config.retry.delay_max_secs < config.retry.delay_min_secs {
        return Err(ConfigError::Validation(
            "retry.delay-max-secs must be >= retry.delay-min-secs".to_string(),
        ));
    }

    check_http_url(&config.store.base_url)?;

    if config.sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[source]] is required".to_string(),
        ));
    }
    for source in &config.sources {
        check_http_url(&source.url)?;
        if source.item_pattern.is_empty() {
            return Err(ConfigError::Validation(format!(
                "source {}: item-pattern must not be empty",
                source.url
            )));
        }
    }

    Ok(())
}

fn check_http_url(raw: &str) -> ConfigResult<()> {
    let parsed = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::InvalidUrl(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{SourceConfig, StoreConfig};

    fn valid_config() -> Config {
        Config {
            run: Default::default(),
            retry: Default::default(),
            selectors: Default::default(),
            credentials: Default::default(),
            store: StoreConfig {
                base_url: "https://store.example.com/api".to_string(),
                api_token_env: None,
                postings_table: "postings".to_string(),
                references_table: "references".to_string(),
                postings_folder: "posting-texts".to_string(),
                references_folder: "reference-pages".to_string(),
            },
            sources: vec![SourceConfig {
                url: "https://forum.example.com/c/jobs".to_string(),
                login_required: false,
                item_pattern: "/t/".to_string(),
                exclude: vec![],
            }],
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut config = valid_config();
        config.retry.max_attempts = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn inverted_delay_range_is_rejected() {
        let mut config = valid_config();
        config.retry.delay_min_secs = 5.0;
        config.retry.delay_max_secs = 2.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn non_http_source_url_is_rejected() {
        let mut config = valid_config();
        config.sources[0].url = "ftp://forum.example.com/c/jobs".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn empty_source_list_is_rejected() {
        let mut config = valid_config();
        config.sources.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn empty_item_pattern_is_rejected() {
        let mut config = valid_config();
        config.sources[0].item_pattern.clear();
        assert!(validate_config(&config).is_err());
    }
}
