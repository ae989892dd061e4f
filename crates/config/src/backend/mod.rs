//! Backends: key/value sources consulted during a load pass
//!
//! Every backend has a stable [`name`](Backend::name), matched against the
//! `backend = "..."` field annotation, and a raw [`fetch`](Backend::fetch).
//! Backends holding structured data can also expose the direct-decode
//! capability through [`Backend::decoder`]; the loader then hands them the
//! field itself instead of converting raw bytes.

use async_trait::async_trait;

use crate::core::{BackendResult, Field, LoadContext};

mod env;
mod file;
mod func;
mod map;

pub use env::EnvBackend;
pub use file::{FileBackend, FileFormat};
pub use func::{FnBackend, from_fn};
pub use map::MapBackend;

/// A key/value source
#[async_trait]
pub trait Backend: Send + Sync {
    /// Name compared with the `backend` field annotation
    fn name(&self) -> &str;

    /// Fetch the raw value stored under `key`.
    ///
    /// Returns [`BackendError::NotFound`](crate::BackendError::NotFound) when
    /// the key is absent; any other error aborts the load.
    async fn fetch(&self, ctx: &LoadContext, key: &str) -> BackendResult<Vec<u8>>;

    /// Direct-decode capability, if this backend has one
    fn decoder(&self) -> Option<&dyn Decode> {
        None
    }
}

/// Direct-decode capability of a backend
#[async_trait]
pub trait Decode: Send + Sync {
    /// Decode the value stored under `key` straight into `target`.
    ///
    /// Same not-found contract as [`Backend::fetch`].
    async fn decode(
        &self,
        ctx: &LoadContext,
        key: &str,
        target: &mut dyn Field,
    ) -> BackendResult<()>;
}

/// Keys whose values are never written to logs
pub(crate) fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    ["password", "secret", "token", "api_key", "apikey", "private", "credential"]
        .iter()
        .any(|marker| key.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sensitive_key() {
        assert!(is_sensitive_key("PASSWORD"));
        assert!(is_sensitive_key("api_key"));
        assert!(is_sensitive_key("db.secret-token"));
        assert!(is_sensitive_key("private_data"));
        assert!(!is_sensitive_key("USERNAME"));
        assert!(!is_sensitive_key("port"));
    }
}
