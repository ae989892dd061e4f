//! Per-field tag metadata
//!
//! A tag is the string given to `#[config("...")]`:
//!
//! - `"key"` resolves the field under `key`
//! - `"key,required"` additionally fails the load when no backend has `key`
//! - `"-"` excludes the field, and everything below it, from loading

use super::error::DefinitionError;

/// Option marking a field as required
pub const REQUIRED: &str = "required";

/// Tag value marking a field as ignored
pub const IGNORED: &str = "-";

/// Parsed field tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// The field takes no part in loading
    Ignored,
    /// The field is resolved under `key`
    Key {
        /// Lookup key sent to backends
        key: String,
        /// Fail the load if the key is never resolved
        required: bool,
    },
}

impl Tag {
    /// Parse a raw tag attached to the field at `field`.
    pub fn parse(field: &str, raw: &str) -> Result<Self, DefinitionError> {
        let malformed = |reason: &str| DefinitionError::malformed_tag(field, raw, reason);

        let mut parts = raw.split(',').map(str::trim);
        let key = parts.next().unwrap_or_default();

        if key.is_empty() {
            return Err(malformed("missing key"));
        }

        let mut required = false;
        for option in parts {
            match option {
                "" => return Err(malformed("empty option")),
                REQUIRED if required => return Err(malformed("duplicate option `required`")),
                REQUIRED => required = true,
                other => return Err(malformed(&format!("unknown option `{other}`"))),
            }
        }

        if key == IGNORED {
            return if required {
                Err(malformed("the ignore marker takes no options"))
            } else {
                Ok(Self::Ignored)
            };
        }

        Ok(Self::Key {
            key: key.to_string(),
            required,
        })
    }

    /// Check if this tag excludes its field
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}
