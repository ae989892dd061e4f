//! Leaf field storage
//!
//! [`Field`] is the type-erased handle a field descriptor holds into the
//! configuration object. It knows the declared [`Kind`] of the field and how
//! to store a value arriving either as raw bytes (through [`FromRaw`]) or as
//! an already structured value from a decoding backend.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::convert::FromRaw;
use super::error::ParseFailure;

/// Declared type of a leaf field
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `i128`
    I128,
    /// `isize`
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `usize`
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    Text,
    /// `char`
    Char,
    /// `std::time::Duration`
    Duration,
    /// `PathBuf`
    Path,
    /// `IpAddr`
    IpAddr,
    /// `Ipv4Addr`
    Ipv4Addr,
    /// `Ipv6Addr`
    Ipv6Addr,
    /// `SocketAddr`
    SocketAddr,
    /// `Vec<T>`, JSON array
    List,
    /// [`Json<T>`], any JSON document
    Json,
}

impl Kind {
    /// Name used in messages
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Text => "string",
            Self::Char => "char",
            Self::Duration => "duration",
            Self::Path => "path",
            Self::IpAddr => "ip address",
            Self::Ipv4Addr => "ipv4 address",
            Self::Ipv6Addr => "ipv6 address",
            Self::SocketAddr => "socket address",
            Self::List => "list",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage for one leaf field of a configuration object.
///
/// Implemented for every [`FromRaw`] scalar, for `Option` of those (a
/// resolved value allocates `Some`), for `Vec<T>` and for [`Json<T>`].
/// Both setters leave the field untouched when they fail.
pub trait Field: Send {
    /// Declared kind of the field
    fn kind(&self) -> Kind;

    /// Store a value parsed from raw backend bytes
    fn set_raw(&mut self, raw: &[u8]) -> Result<(), ParseFailure>;

    /// Store a value a backend has already decoded
    fn set_decoded(&mut self, value: Value) -> Result<(), ParseFailure>;
}

/// Decode a structured value into a scalar.
///
/// Scalars are routed through their textual form so that `"8080"` and
/// `8080` decode alike; arrays and objects go through serde.
fn decode_scalar<T: FromRaw + DeserializeOwned>(value: Value) -> Result<T, ParseFailure> {
    match value {
        Value::String(text) => T::from_raw(text.as_bytes()),
        Value::Bool(_) | Value::Number(_) => T::from_raw(value.to_string().as_bytes()),
        other => serde_json::from_value(other).map_err(ParseFailure::new),
    }
}

macro_rules! scalar_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn kind(&self) -> Kind {
                    <$ty as FromRaw>::KIND
                }

                fn set_raw(&mut self, raw: &[u8]) -> Result<(), ParseFailure> {
                    *self = <$ty>::from_raw(raw)?;
                    Ok(())
                }

                fn set_decoded(&mut self, value: Value) -> Result<(), ParseFailure> {
                    *self = decode_scalar::<$ty>(value)?;
                    Ok(())
                }
            }

            impl Field for Option<$ty> {
                fn kind(&self) -> Kind {
                    <$ty as FromRaw>::KIND
                }

                fn set_raw(&mut self, raw: &[u8]) -> Result<(), ParseFailure> {
                    *self = Some(<$ty>::from_raw(raw)?);
                    Ok(())
                }

                fn set_decoded(&mut self, value: Value) -> Result<(), ParseFailure> {
                    *self = Some(decode_scalar::<$ty>(value)?);
                    Ok(())
                }
            }
        )*
    };
}

scalar_field!(
    bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    char, Duration, PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl<T> Field for Vec<T>
where
    T: DeserializeOwned + Send,
{
    fn kind(&self) -> Kind {
        Kind::List
    }

    fn set_raw(&mut self, raw: &[u8]) -> Result<(), ParseFailure> {
        *self = serde_json::from_slice(raw).map_err(ParseFailure::new)?;
        Ok(())
    }

    fn set_decoded(&mut self, value: Value) -> Result<(), ParseFailure> {
        *self = serde_json::from_value(value).map_err(ParseFailure::new)?;
        Ok(())
    }
}

/// Field holding any `serde` type, read as a JSON document.
///
/// Raw backend bytes are parsed as JSON; decoding backends hand their value
/// straight to serde.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> Field for Json<T>
where
    T: DeserializeOwned + Send,
{
    fn kind(&self) -> Kind {
        Kind::Json
    }

    fn set_raw(&mut self, raw: &[u8]) -> Result<(), ParseFailure> {
        self.0 = serde_json::from_slice(raw).map_err(ParseFailure::new)?;
        Ok(())
    }

    fn set_decoded(&mut self, value: Value) -> Result<(), ParseFailure> {
        self.0 = serde_json::from_value(value).map_err(ParseFailure::new)?;
        Ok(())
    }
}
