//! Core configuration loading types

pub mod context;
pub mod convert;
pub mod duration;
pub mod error;
pub mod field;
pub mod tag;
pub mod walk;

pub use context::LoadContext;
pub use convert::FromRaw;
pub use error::{
    BackendError, BackendResult, ConversionError, DefinitionError, ErrorCategory, LoadError,
    LoadResult, ParseFailure,
};
pub use field::{Field, Json, Kind};
pub use tag::Tag;
pub use walk::{Configurable, FieldDescriptor, Node, Walker};
