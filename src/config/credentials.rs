//! Secret resolution from the environment
//!
//! The configuration file names environment variables; the secrets
//! themselves only ever live in the process environment.

use crate::config::types::{CredentialsConfig, StoreConfig};
use crate::{HarvestError, Result};

/// Login credentials for sources that require authentication
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Resolves login credentials from the configured environment variables
///
/// When `required` is false (no source needs a login) missing variables
/// resolve to `None` instead of an error.
pub fn resolve_credentials(
    config: &CredentialsConfig,
    required: bool,
) -> Result<Option<Credentials>> {
    let username = std::env::var(&config.username_env).ok();
    let password = std::env::var(&config.password_env).ok();

    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(Credentials { username, password })),
        (None, _) if required => Err(HarvestError::MissingCredential {
            var: config.username_env.clone(),
        }),
        (_, None) if required => Err(HarvestError::MissingCredential {
            var: config.password_env.clone(),
        }),
        _ => Ok(None),
    }
}

/// Resolves the store API token, when the configuration names one
pub fn resolve_store_token(config: &StoreConfig) -> Result<Option<String>> {
    match &config.api_token_env {
        Some(var) => std::env::var(var)
            .map(Some)
            .map_err(|_| HarvestError::MissingCredential { var: var.clone() }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses distinct variable names; the test binary runs its
    // tests in shared process environment.

    #[test]
    fn both_variables_present_yields_credentials() {
        std::env::set_var("CRED_TEST_USER_A", "alice");
        std::env::set_var("CRED_TEST_PASS_A", "s3cret");
        let config = CredentialsConfig {
            username_env: "CRED_TEST_USER_A".to_string(),
            password_env: "CRED_TEST_PASS_A".to_string(),
        };

        let credentials = resolve_credentials(&config, true).unwrap().unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password, "s3cret");
    }

    #[test]
    fn missing_variable_errors_only_when_required() {
        let config = CredentialsConfig {
            username_env: "CRED_TEST_USER_B".to_string(),
            password_env: "CRED_TEST_PASS_B".to_string(),
        };

        assert!(resolve_credentials(&config, false).unwrap().is_none());
        let err = resolve_credentials(&config, true).unwrap_err();
        assert!(matches!(err, HarvestError::MissingCredential { var } if var == "CRED_TEST_USER_B"));
    }

    #[test]
    fn token_is_optional_unless_configured() {
        let mut store = StoreConfig {
            base_url: "https://store.example.com".to_string(),
            api_token_env: None,
            postings_table: "postings".to_string(),
            references_table: "references".to_string(),
            postings_folder: "a".to_string(),
            references_folder: "b".to_string(),
        };
        assert!(resolve_store_token(&store).unwrap().is_none());

        store.api_token_env = Some("CRED_TEST_TOKEN_C".to_string());
        assert!(resolve_store_token(&store).is_err());

        std::env::set_var("CRED_TEST_TOKEN_C", "tok");
        assert_eq!(resolve_store_token(&store).unwrap().as_deref(), Some("tok"));
    }
}
