//! Configuration loader

use std::fmt;
use std::sync::Arc;

use crate::backend::{Backend, EnvBackend};
use crate::core::{BackendError, Configurable, LoadContext, LoadError, LoadResult, Walker};
use crate::resolver::{Resolution, Resolver, Via};

/// Phase of a load pass, reported in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// No pass has run yet
    NotStarted,
    /// Building field descriptors
    Walking,
    /// Querying backends
    Resolving,
    /// Finished
    Done,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not-started",
            Self::Walking => "walking",
            Self::Resolving => "resolving",
            Self::Done => "done",
        })
    }
}

/// Where a resolved field got its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Dotted path of the field
    pub path: String,
    /// Key it was resolved under
    pub key: String,
    /// Backend that supplied it
    pub backend: String,
    /// Path the value took
    pub via: Via,
}

/// Summary of a successful load pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    resolved: Vec<ResolvedField>,
    unresolved: Vec<String>,
}

impl LoadReport {
    /// Fields that received a value, in walk order
    pub fn resolved(&self) -> &[ResolvedField] {
        &self.resolved
    }

    /// Keys of optional fields left at their previous value
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Name of the backend that supplied `key`
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.resolved
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.backend.as_str())
    }
}

/// Loads configuration objects from an ordered chain of backends.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use stratum_config::{Configurable, EnvBackend, FileBackend, LoadContext, Loader};
///
/// #[derive(Configurable)]
/// struct Settings {
///     #[config("listen-addr,required")]
///     listen: std::net::SocketAddr,
///     #[config("shutdown-timeout")]
///     shutdown_timeout: Duration,
/// }
///
/// # async fn run() -> Result<(), stratum_config::LoadError> {
/// let loader = Loader::builder()
///     .with_backend(EnvBackend::with_prefix("APP"))
///     .with_backend(FileBackend::new("settings.yaml").optional())
///     .build();
///
/// let mut settings = Settings {
///     listen: "0.0.0.0:8080".parse().unwrap(),
///     shutdown_timeout: Duration::from_secs(30),
/// };
/// loader.load(&LoadContext::new(), &mut settings).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Loader {
    /// Backends in precedence order
    backends: Vec<Arc<dyn Backend>>,
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("backends", &self.backend_names().collect::<Vec<_>>())
            .finish()
    }
}

impl Loader {
    /// Create a loader over `backends`, in precedence order.
    ///
    /// An empty list falls back to a single [`EnvBackend`].
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Self {
        if backends.is_empty() {
            return Self::default();
        }
        Self { backends }
    }

    /// Start building a loader
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::new()
    }

    /// Backend names in precedence order
    pub fn backend_names(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(|backend| backend.name())
    }

    /// Populate `config` from the backend chain.
    ///
    /// Fields left unresolved keep their previous value, unless they are
    /// required. Backend failures, conversion failures, cancellation and
    /// deadline expiry end the pass at once; missing required fields are
    /// collected and reported together after the full pass.
    #[tracing::instrument(name = "config.load", skip_all, fields(backends = self.backends.len()))]
    pub async fn load<C>(&self, ctx: &LoadContext, config: &mut C) -> LoadResult<LoadReport>
    where
        C: Configurable + ?Sized,
    {
        tracing::trace!(phase = %LoadPhase::NotStarted, "load requested");
        let resolver = Resolver::new(&self.backends);

        tracing::debug!(phase = %LoadPhase::Walking, "walking configuration");
        let mut fields = Walker::walk(config)?;
        resolver.validate(&fields)?;

        tracing::info!(
            phase = %LoadPhase::Resolving,
            fields = fields.len(),
            backends = self.backends.len(),
            "loading configuration"
        );
        interrupted(ctx)?;
        let mut report = LoadReport::default();
        let mut missing = Vec::new();

        for field in &mut fields {
            interrupted(ctx)?;

            match resolver.resolve(ctx, field).await? {
                Resolution::Resolved { backend, via } => {
                    tracing::debug!(
                        path = %field.path,
                        key = %field.key,
                        backend = %backend,
                        "resolved configuration field"
                    );
                    report.resolved.push(ResolvedField {
                        path: field.path.clone(),
                        key: field.key.clone(),
                        backend,
                        via,
                    });
                }
                Resolution::Unresolved if field.required => {
                    tracing::warn!(
                        path = %field.path,
                        key = %field.key,
                        "required configuration key not found"
                    );
                    missing.push(field.key.clone());
                }
                Resolution::Unresolved => report.unresolved.push(field.key.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(LoadError::MissingRequired { keys: missing });
        }

        tracing::info!(
            phase = %LoadPhase::Done,
            resolved = report.resolved.len(),
            unresolved = report.unresolved.len(),
            "configuration loaded"
        );
        Ok(report)
    }
}

/// Fail with the abort error of a canceled or expired context
fn interrupted(ctx: &LoadContext) -> LoadResult<()> {
    match ctx.check() {
        Ok(()) => Ok(()),
        Err(BackendError::DeadlineExceeded) => Err(LoadError::DeadlineExceeded),
        Err(_) => Err(LoadError::Canceled),
    }
}

impl Default for Loader {
    /// Environment-only loader
    fn default() -> Self {
        Self {
            backends: vec![Arc::new(EnvBackend::new())],
        }
    }
}

/// Builder for [`Loader`]
#[derive(Default)]
pub struct LoaderBuilder {
    backends: Vec<Arc<dyn Backend>>,
}

impl fmt::Debug for LoaderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderBuilder")
            .field("backends", &format!("{} backends", self.backends.len()))
            .finish()
    }
}

impl LoaderBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend; earlier backends take precedence
    #[must_use = "builder methods must be chained or built"]
    pub fn with_backend<B: Backend + 'static>(mut self, backend: B) -> Self {
        self.backends.push(Arc::new(backend));
        self
    }

    /// Append a shared backend
    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Build the loader
    pub fn build(self) -> Loader {
        Loader::new(self.backends)
    }
}
