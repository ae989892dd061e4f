//! Structure walking
//!
//! A configuration type exposes its shape through [`Configurable::walk`],
//! normally generated by `#[derive(Configurable)]`. The walk hands every
//! field to a [`Walker`]: tagged fields become [`FieldDescriptor`]s, untagged
//! fields are visited as [`Node`]s. The resulting descriptors borrow the
//! fields mutably for the duration of one load pass.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use super::error::DefinitionError;
use super::field::{Field, Json, Kind};
use super::tag::Tag;

/// A configuration object whose fields can be loaded.
///
/// Derive it with `#[derive(Configurable)]`:
///
/// ```rust
/// use stratum_config::Configurable;
///
/// #[derive(Configurable, Default)]
/// struct Server {
///     #[config("host,required")]
///     host: String,
///     #[config("port")]
///     port: u16,
///     #[config("token", backend = "env")]
///     token: Option<String>,
///     #[config("-")]
///     runtime_only: Vec<u8>,
/// }
/// ```
pub trait Configurable: Send {
    /// Hand every field of `self`, in declaration order, to `walker`.
    fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), DefinitionError>;
}

/// An untagged field.
///
/// Structures are traversed as containers, `Option` and `Box` forward to
/// their content when present. Scalars, collections, shared pointers and
/// time points are ignored.
///
/// Every untagged field type must implement `Node`. For a struct, derive
/// [`Configurable`]. Any other type of your own can be ignored either by
/// tagging the field `#[config("-")]` or with an empty implementation:
///
/// ```rust
/// use stratum_config::{DefinitionError, Node, Walker};
///
/// enum Mode {
///     Fast,
///     Safe,
/// }
///
/// impl Node for Mode {
///     fn visit<'a>(&'a mut self, _walker: &mut Walker<'a>) -> Result<(), DefinitionError> {
///         Ok(())
///     }
/// }
/// ```
pub trait Node: Send {
    /// Visit the fields below this node, if any.
    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), DefinitionError>;
}

/// A nested structure that is absent is skipped, never allocated.
impl<T: Node> Node for Option<T> {
    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), DefinitionError> {
        match self {
            Some(inner) => inner.visit(walker),
            None => Ok(()),
        }
    }
}

impl<T: Node + ?Sized> Node for Box<T> {
    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), DefinitionError> {
        (**self).visit(walker)
    }
}

macro_rules! leaf_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Node for $ty {
                fn visit<'a>(&'a mut self, _walker: &mut Walker<'a>) -> Result<(), DefinitionError> {
                    Ok(())
                }
            }
        )*
    };
}

leaf_node!(
    (), bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    &'static str, char, Duration, Instant, SystemTime, PathBuf, IpAddr, Ipv4Addr, Ipv6Addr,
    SocketAddr, serde_json::Value,
);

/// Generic containers whose content is never walked
macro_rules! opaque_node {
    ($($ty:ident<$($param:ident),+>),* $(,)?) => {
        $(
            impl<$($param: Send),+> Node for $ty<$($param),+> {
                fn visit<'a>(&'a mut self, _walker: &mut Walker<'a>) -> Result<(), DefinitionError> {
                    Ok(())
                }
            }
        )*
    };
}

opaque_node!(
    Vec<T>,
    VecDeque<T>,
    Json<T>,
    HashMap<K, V, S>,
    HashSet<T, S>,
    BTreeMap<K, V>,
    BTreeSet<T>,
);

impl<T: Send, const N: usize> Node for [T; N] {
    fn visit<'a>(&'a mut self, _walker: &mut Walker<'a>) -> Result<(), DefinitionError> {
        Ok(())
    }
}

/// Shared content cannot be written through, so it is ignored.
impl<T: Send + Sync + ?Sized> Node for Arc<T> {
    fn visit<'a>(&'a mut self, _walker: &mut Walker<'a>) -> Result<(), DefinitionError> {
        Ok(())
    }
}

/// One leaf field eligible for resolution
pub struct FieldDescriptor<'a> {
    pub(crate) path: String,
    pub(crate) key: String,
    pub(crate) required: bool,
    pub(crate) backend: Option<String>,
    pub(crate) location: &'a mut dyn Field,
}

impl FieldDescriptor<'_> {
    /// Dotted path of the field from the root, e.g. `database.port`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Lookup key sent to backends
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the load fails if the field stays unresolved
    pub fn required(&self) -> bool {
        self.required
    }

    /// Name of the only backend allowed to supply this field
    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    /// Declared type of the field
    pub fn kind(&self) -> Kind {
        self.location.kind()
    }
}

impl fmt::Debug for FieldDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("path", &self.path)
            .field("key", &self.key)
            .field("required", &self.required)
            .field("backend", &self.backend)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Collects field descriptors while a configuration object is walked
#[derive(Debug, Default)]
pub struct Walker<'a> {
    fields: Vec<FieldDescriptor<'a>>,
    path: Vec<&'static str>,
}

impl<'a> Walker<'a> {
    /// Walk `config` and return its descriptors in pre-order, declaration order.
    pub fn walk<C>(config: &'a mut C) -> Result<Vec<FieldDescriptor<'a>>, DefinitionError>
    where
        C: Configurable + ?Sized,
    {
        let mut walker = Walker::default();
        config.walk(&mut walker)?;
        Ok(walker.fields)
    }

    /// Register a tagged leaf field.
    ///
    /// `tag` follows the `key[,required]` syntax, or `-` to ignore the field.
    /// `backend` restricts resolution to the backend with that name.
    pub fn field<F>(
        &mut self,
        name: &'static str,
        tag: &str,
        backend: Option<&str>,
        location: &'a mut F,
    ) -> Result<(), DefinitionError>
    where
        F: Field,
    {
        let path = self.path_of(name);
        let (key, required) = match Tag::parse(&path, tag)? {
            Tag::Ignored => return Ok(()),
            Tag::Key { key, required } => (key, required),
        };

        if backend.is_some_and(str::is_empty) {
            return Err(DefinitionError::malformed_tag(
                path,
                tag,
                "empty backend name",
            ));
        }

        self.fields.push(FieldDescriptor {
            path,
            key,
            required,
            backend: backend.map(str::to_string),
            location,
        });
        Ok(())
    }

    /// Visit an untagged field.
    pub fn node<N>(&mut self, name: &'static str, node: &'a mut N) -> Result<(), DefinitionError>
    where
        N: Node + ?Sized,
    {
        self.path.push(name);
        let result = node.visit(self);
        self.path.pop();
        result
    }

    /// Number of descriptors collected so far
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no descriptor has been collected yet
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn path_of(&self, name: &str) -> String {
        let mut path = self.path.join(".");
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(name);
        path
    }
}
