//! # Stratum Config
//!
//! Typed configuration loading over an ordered chain of key/value backends.
//!
//! A configuration type declares, per field, the key it is loaded from.
//! A [`Loader`] walks the type, asks each backend in turn for every key and
//! writes the first value found into the field, converted to the field's
//! type. Fields nobody has a value for keep whatever they held before the
//! load, so defaults are simply the values the object was created with.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use stratum_config::prelude::*;
//!
//! #[derive(Configurable)]
//! struct Database {
//!     #[config("database-url,required")]
//!     url: String,
//!     #[config("database-pool-size")]
//!     pool_size: u32,
//! }
//!
//! #[derive(Configurable)]
//! struct Settings {
//!     #[config("request-timeout")]
//!     timeout: Duration,
//!     #[config("api-token", backend = "env")]
//!     token: Option<String>,
//!     database: Database,
//! }
//!
//! # async fn run() -> Result<(), LoadError> {
//! let loader = Loader::builder()
//!     .with_backend(EnvBackend::new())
//!     .with_backend(FileBackend::new("settings.toml").optional())
//!     .build();
//!
//! let mut settings = Settings {
//!     timeout: Duration::from_secs(5),
//!     token: None,
//!     database: Database {
//!         url: String::new(),
//!         pool_size: 10,
//!     },
//! };
//!
//! let ctx = LoadContext::new().with_timeout(Duration::from_secs(2));
//! let report = loader.load(&ctx, &mut settings).await?;
//! println!("pool size from {:?}", report.source_of("database-pool-size"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Tags
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `#[config("key")]` | Load the field from `key` |
//! | `#[config("key,required")]` | Fail when no backend has `key` |
//! | `#[config("key", backend = "env")]` | Only ask the backend named `env` |
//! | `#[config("-")]`, `#[config(skip)]` | Never touch the field |
//! | none | Walk into the field as a nested structure |
//!
//! ## Backends
//!
//! - [`EnvBackend`] - process environment, the default when no backend is given
//! - [`FileBackend`] - JSON, YAML or TOML document, decoding values directly
//! - [`MapBackend`] - in-memory map
//! - [`backend::from_fn`] - any async closure

#![warn(missing_docs)]

extern crate self as stratum_config;

pub mod backend;
pub mod core;
mod loader;
mod resolver;

pub use backend::{Backend, Decode, EnvBackend, FileBackend, FileFormat, FnBackend, MapBackend};
pub use self::core::{
    BackendError, BackendResult, Configurable, ConversionError, DefinitionError, ErrorCategory,
    Field, FieldDescriptor, FromRaw, Json, Kind, LoadContext, LoadError, LoadResult, Node,
    ParseFailure, Tag, Walker,
};
pub use loader::{LoadPhase, LoadReport, Loader, LoaderBuilder, ResolvedField};
pub use resolver::Via;
pub use stratum_config_macros::Configurable;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        Backend, BackendError, Configurable, EnvBackend, FileBackend, Json, LoadContext,
        LoadError, LoadReport, Loader, MapBackend,
    };
}
