//! Conversion of raw backend bytes into typed values

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::duration;
use super::error::ParseFailure;
use super::field::Kind;

/// A type that can be parsed from the raw bytes a backend returns
pub trait FromRaw: Sized {
    /// Declared kind reported in conversion errors
    const KIND: Kind;

    /// Parse `raw` into a value of this type
    fn from_raw(raw: &[u8]) -> Result<Self, ParseFailure>;
}

/// Interpret raw bytes as UTF-8 text.
pub fn text(raw: &[u8]) -> Result<&str, ParseFailure> {
    std::str::from_utf8(raw).map_err(|e| ParseFailure::new(format!("invalid UTF-8: {e}")))
}

impl FromRaw for bool {
    const KIND: Kind = Kind::Bool;

    fn from_raw(raw: &[u8]) -> Result<Self, ParseFailure> {
        match text(raw)? {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            other => Err(ParseFailure::new(format!(
                "{other:?} is not a boolean"
            ))),
        }
    }
}

impl FromRaw for String {
    const KIND: Kind = Kind::Text;

    fn from_raw(raw: &[u8]) -> Result<Self, ParseFailure> {
        text(raw).map(str::to_owned)
    }
}

impl FromRaw for PathBuf {
    const KIND: Kind = Kind::Path;

    fn from_raw(raw: &[u8]) -> Result<Self, ParseFailure> {
        text(raw).map(PathBuf::from)
    }
}

impl FromRaw for Duration {
    const KIND: Kind = Kind::Duration;

    fn from_raw(raw: &[u8]) -> Result<Self, ParseFailure> {
        duration::parse(text(raw)?)
    }
}

/// Integers and other types whose `FromStr` already validates width.
macro_rules! from_str_raw {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FromRaw for $ty {
                const KIND: Kind = Kind::$kind;

                fn from_raw(raw: &[u8]) -> Result<Self, ParseFailure> {
                    <$ty>::from_str(text(raw)?).map_err(ParseFailure::new)
                }
            }
        )*
    };
}

from_str_raw! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    char => Char,
    IpAddr => IpAddr,
    Ipv4Addr => Ipv4Addr,
    Ipv6Addr => Ipv6Addr,
    SocketAddr => SocketAddr,
}

/// Floats overflow to infinity instead of failing, so finite literals that
/// do not fit the width are rejected here.
macro_rules! float_raw {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FromRaw for $ty {
                const KIND: Kind = Kind::$kind;

                fn from_raw(raw: &[u8]) -> Result<Self, ParseFailure> {
                    let text = text(raw)?;
                    let value = <$ty>::from_str(text).map_err(ParseFailure::new)?;
                    if value.is_infinite() && !names_infinity(text) {
                        return Err(ParseFailure::new(format!(
                            "{text:?} is out of range for {}",
                            Kind::$kind
                        )));
                    }
                    Ok(value)
                }
            }
        )*
    };
}

float_raw! {
    f32 => F32,
    f64 => F64,
}

fn names_infinity(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}
