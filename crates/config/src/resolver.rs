//! Per-field resolution against the backend chain

use std::sync::Arc;

use crate::backend::{Backend, is_sensitive_key};
use crate::core::{
    BackendError, DefinitionError, FieldDescriptor, LoadContext, LoadError, LoadResult,
};

/// How a resolved field got its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    /// Raw bytes converted by the type converter
    Fetch,
    /// Decoded by the backend itself
    Decode,
}

/// Outcome of resolving one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// A backend supplied the value
    Resolved {
        /// Name of the backend
        backend: String,
        /// Path taken
        via: Via,
    },
    /// No candidate had the key
    Unresolved,
}

/// Resolves field descriptors against an ordered backend chain
pub(crate) struct Resolver<'c> {
    chain: &'c [Arc<dyn Backend>],
}

impl<'c> Resolver<'c> {
    pub(crate) fn new(chain: &'c [Arc<dyn Backend>]) -> Self {
        Self { chain }
    }

    /// Check every backend filter before any backend is contacted.
    pub(crate) fn validate(&self, fields: &[FieldDescriptor<'_>]) -> Result<(), DefinitionError> {
        for field in fields {
            self.candidates(field)?;
        }
        Ok(())
    }

    /// Backends to query for `field`, in order
    fn candidates(
        &self,
        field: &FieldDescriptor<'_>,
    ) -> Result<&'c [Arc<dyn Backend>], DefinitionError> {
        let Some(wanted) = field.backend.as_deref() else {
            return Ok(self.chain);
        };

        self.chain
            .iter()
            .position(|backend| backend.name() == wanted)
            .map(|index| &self.chain[index..=index])
            .ok_or_else(|| DefinitionError::unknown_backend(&field.path, &field.key, wanted))
    }

    /// Resolve one field, writing the value into its location.
    ///
    /// The first candidate returning a value or an error other than
    /// not-found decides the outcome.
    pub(crate) async fn resolve(
        &self,
        ctx: &LoadContext,
        field: &mut FieldDescriptor<'_>,
    ) -> LoadResult<Resolution> {
        for backend in self.candidates(field)? {
            let name = backend.name();

            let outcome = match backend.decoder() {
                Some(decoder) => ctx
                    .run(decoder.decode(ctx, &field.key, &mut *field.location))
                    .await
                    .map(|()| Via::Decode),
                None => match ctx.run(backend.fetch(ctx, &field.key)).await {
                    Ok(raw) => {
                        trace_value(&field.key, name, &raw);
                        let kind = field.location.kind();
                        field
                            .location
                            .set_raw(&raw)
                            .map_err(|e| e.into_conversion(&field.key, &raw, kind))?;
                        Ok(Via::Fetch)
                    }
                    Err(e) => Err(e),
                },
            };

            match outcome {
                Ok(via) => {
                    return Ok(Resolution::Resolved {
                        backend: name.to_string(),
                        via,
                    });
                }
                Err(BackendError::NotFound) => {
                    tracing::trace!(key = %field.key, backend = name, "key not found");
                }
                Err(e) => return Err(LoadError::backend(name, &field.key, e)),
            }
        }

        Ok(Resolution::Unresolved)
    }
}

fn trace_value(key: &str, backend: &str, raw: &[u8]) {
    if is_sensitive_key(key) {
        tracing::trace!(key, backend, "fetched value [REDACTED]");
    } else {
        tracing::trace!(key, backend, value = %String::from_utf8_lossy(raw), "fetched value");
    }
}
