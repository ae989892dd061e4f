//! Environment variable backend

use std::ffi::OsString;

use async_trait::async_trait;

use super::{Backend, is_sensitive_key};
use crate::core::{BackendError, BackendResult, LoadContext};

/// Backend reading process environment variables.
///
/// A key is looked up verbatim first, then in its conventional form:
/// upper-cased, with `-` and `.` replaced by `_`. With a prefix, both
/// lookups use `<PREFIX>_<key>`.
#[derive(Debug, Clone, Default)]
pub struct EnvBackend {
    /// Variable name prefix
    pub prefix: Option<String>,
}

impl EnvBackend {
    /// Name of the environment backend
    pub const NAME: &'static str = "env";

    /// Create a backend without prefix
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Create a backend reading `<PREFIX>_<key>` variables
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Variable names tried for `key`, in lookup order
    fn variable_names(&self, key: &str) -> Vec<String> {
        let verbatim = match &self.prefix {
            Some(prefix) => format!("{prefix}_{key}"),
            None => key.to_string(),
        };
        let conventional = verbatim.to_uppercase().replace(['-', '.'], "_");

        if conventional == verbatim {
            vec![verbatim]
        } else {
            vec![verbatim, conventional]
        }
    }

    fn lookup(&self, key: &str) -> Option<(String, OsString)> {
        self.variable_names(key)
            .into_iter()
            .find_map(|name| std::env::var_os(&name).map(|value| (name, value)))
    }
}

#[async_trait]
impl Backend for EnvBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, _ctx: &LoadContext, key: &str) -> BackendResult<Vec<u8>> {
        let (variable, value) = self.lookup(key).ok_or(BackendError::NotFound)?;

        if is_sensitive_key(&variable) {
            tracing::trace!(key, variable = %variable, "read environment variable [REDACTED]");
        } else {
            tracing::trace!(key, variable = %variable, value = ?value, "read environment variable");
        }

        Ok(value.into_encoded_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_names_include_conventional_form() {
        let backend = EnvBackend::new();
        assert_eq!(
            backend.variable_names("db-url"),
            ["db-url", "DB_URL"]
        );
        assert_eq!(backend.variable_names("PORT"), ["PORT"]);
    }

    #[test]
    fn prefix_applies_to_every_name() {
        let backend = EnvBackend::with_prefix("app");
        assert_eq!(
            backend.variable_names("log.level"),
            ["app_log.level", "APP_LOG_LEVEL"]
        );
    }

    #[tokio::test]
    #[allow(unsafe_code)]
    async fn reads_conventional_variable_names() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("STRATUM_ENV_TEST_HTTP_PORT", "8080") };

        let backend = EnvBackend::with_prefix("STRATUM_ENV_TEST");
        let ctx = LoadContext::new();

        assert_eq!(backend.fetch(&ctx, "http-port").await.unwrap(), b"8080");
        assert_eq!(
            backend.fetch(&ctx, "missing").await,
            Err(BackendError::NotFound)
        );
    }
}
