//! Backend built from a closure

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use super::Backend;
use crate::core::{BackendResult, LoadContext};

/// Backend delegating every fetch to a closure
pub struct FnBackend<F> {
    name: String,
    fetch: F,
}

/// Create a backend named `name` that fetches with `fetch`.
///
/// ```rust
/// use stratum_config::{BackendError, backend};
///
/// let secrets = backend::from_fn("secrets", |_ctx, key| async move {
///     match key.as_str() {
///         "api-token" => Ok(b"s3cr3t".to_vec()),
///         _ => Err(BackendError::NotFound),
///     }
/// });
/// ```
pub fn from_fn<F, Fut>(name: impl Into<String>, fetch: F) -> FnBackend<F>
where
    F: Fn(LoadContext, String) -> Fut + Send + Sync,
    Fut: Future<Output = BackendResult<Vec<u8>>> + Send,
{
    FnBackend {
        name: name.into(),
        fetch,
    }
}

impl<F> fmt::Debug for FnBackend<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBackend")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Backend for FnBackend<F>
where
    F: Fn(LoadContext, String) -> Fut + Send + Sync,
    Fut: Future<Output = BackendResult<Vec<u8>>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, ctx: &LoadContext, key: &str) -> BackendResult<Vec<u8>> {
        (self.fetch)(ctx.clone(), key.to_string()).await
    }
}
