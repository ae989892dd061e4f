//! # Stratum Config Macros
//!
//! Derive macro for `stratum_config::Configurable`.
//!
//! ```ignore
//! use stratum_config::Configurable;
//!
//! #[derive(Configurable)]
//! pub struct Server {
//!     #[config("host,required")]
//!     host: String,
//!     #[config("port", backend = "env")]
//!     port: u16,
//!     database: Database,
//!     #[config(skip)]
//!     started_at: Option<std::time::Instant>,
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod configurable;
mod support;

/// Derive macro for the `Configurable` trait.
///
/// # Field attributes
///
/// - `#[config("key")]` - Resolve the field under `key`
/// - `#[config("key,required")]` - Same, failing the load when no backend has `key`
/// - `#[config("key", backend = "name")]` - Only query the backend called `name`
/// - `#[config("-")]` or `#[config(skip)]` - Exclude the field from loading
///
/// Fields without `#[config]` are walked as nested structures: their own
/// tagged fields are loaded, `Option` containers only when already `Some`.
/// Tagged fields must implement `stratum_config::Field`, untagged ones
/// `stratum_config::Node`.
///
/// The tag string is validated when the configuration is loaded; a malformed
/// tag fails the load with a definition error.
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
    configurable::derive(input)
}
