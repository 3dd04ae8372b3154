//! Loading and parsing the TOML configuration file

use crate::config::types::Config;
use crate::config::validation::validate_config;
use crate::{ConfigError, ConfigResult};
use std::path::Path;

/// Reads, parses, and validates a configuration file
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: Config = toml::from_str(&raw).map_err(ConfigError::Parse)?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let file = write_config(
            r#"
            [store]
            base-url = "https://store.example.com/api"

            [[source]]
            url = "https://forum.example.com/c/jobs"
            item-pattern = "https://forum.example.com/t/"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_min_secs, 2.0);
        assert_eq!(config.retry.delay_max_secs, 5.0);
        assert_eq!(config.run.max_items, 0);
        assert_eq!(config.selectors.posting_body, ".cooked");
        assert_eq!(config.store.postings_table, "postings");
        assert_eq!(config.sources.len(), 1);
        assert!(!config.sources[0].login_required);
        assert!(config.sources[0].exclude.is_empty());
    }

    #[test]
    fn full_config_round_trips() {
        let file = write_config(
            r##"
            [run]
            max-items = 25

            [retry]
            max-attempts = 3
            delay-min-secs = 0.5
            delay-max-secs = 1.5

            [selectors]
            login-open = ".header-login"
            login-username = "#user"
            login-password = "#pass"
            login-submit = "#go"
            posting-body = ".post-body"

            [credentials]
            username-env = "FORUM_USER"
            password-env = "FORUM_PASS"

            [store]
            base-url = "https://store.example.com/api"
            api-token-env = "STORE_TOKEN"
            postings-table = "jobs"
            references-table = "job-links"
            postings-folder = "job-texts"
            references-folder = "link-pages"

            [[source]]
            url = "https://forum.example.com/c/jobs"
            login-required = true
            item-pattern = "https://forum.example.com/t/"
            exclude = ["about-the-jobs-category"]

            [[source]]
            url = "https://forum.example.com/tag/remote"
            item-pattern = "https://forum.example.com/t/"
            "##,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.run.max_items, 25);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.selectors.login_open, ".header-login");
        assert_eq!(config.credentials.username_env, "FORUM_USER");
        assert_eq!(config.store.api_token_env.as_deref(), Some("STORE_TOKEN"));
        assert_eq!(config.store.references_folder, "link-pages");
        assert_eq!(config.sources.len(), 2);
        assert!(config.sources[0].login_required);
        assert_eq!(config.sources[0].exclude, vec!["about-the-jobs-category"]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write_config(
            r#"
            [store]
            base-url = "https://store.example.com/api"
            typo-field = true

            [[source]]
            url = "https://forum.example.com/c/jobs"
            item-pattern = "/t/"
            "#,
        );

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
