use syn::{
    Attribute, Ident, Lit, LitStr, Meta, Result, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

use crate::support::diag;

/// Parsed attribute arguments container.
#[derive(Debug, Clone, Default)]
pub struct AttrArgs {
    pub items: Vec<AttrItem>,
}

/// A single attribute item.
#[derive(Debug, Clone)]
pub enum AttrItem {
    /// A positional literal like `"key,required"`
    Lit(Lit),
    /// A flag like `skip`
    Flag(Ident),
    /// Key-value pair like `backend = "env"`
    KeyValue { key: Ident, value: AttrValue },
}

/// Value of a key-value pair.
#[derive(Debug, Clone)]
pub enum AttrValue {
    Ident(Ident),
    Lit(Lit),
}

impl AttrValue {
    /// The value as a string literal, or an error naming `key`.
    pub fn require_str(&self, key: &Ident) -> Result<&LitStr> {
        match self {
            Self::Lit(Lit::Str(s)) => Ok(s),
            Self::Lit(other) => Err(diag::error_spanned(
                other,
                format!("expected a string literal for `{key}`"),
            )),
            Self::Ident(other) => Err(diag::error_spanned(
                other,
                format!("expected a string literal for `{key}`, e.g. `{key} = \"{other}\"`"),
            )),
        }
    }
}

/// Parse an attribute like `#[config(...)]` (the whole Attribute, not only args).
pub fn parse_attr(attr: &Attribute, expected: &str) -> Result<Option<AttrArgs>> {
    if !attr.path().is_ident(expected) {
        return Ok(None);
    }

    match &attr.meta {
        Meta::List(list) => {
            let args = syn::parse2::<AttrArgsParser>(list.tokens.clone())?;
            Ok(Some(args.0))
        }
        Meta::Path(path) => Err(diag::error_spanned(
            path,
            format!("#[{expected}] needs arguments, e.g. #[{expected}(\"key\")]"),
        )),
        Meta::NameValue(nv) => Err(diag::error_spanned(
            nv,
            format!("#[{expected}] must be #[{expected}(...)] (not name-value)"),
        )),
    }
}

/// Parse all attributes of a given name and merge them.
pub fn parse_attrs(attrs: &[Attribute], name: &str) -> Result<Option<AttrArgs>> {
    let mut result: Option<AttrArgs> = None;

    for attr in attrs {
        if let Some(args) = parse_attr(attr, name)? {
            result.get_or_insert_default().items.extend(args.items);
        }
    }

    Ok(result)
}

struct AttrArgsParser(AttrArgs);

impl Parse for AttrArgsParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let items = Punctuated::<AttrItemParser, Token![,]>::parse_terminated(input)?
            .into_iter()
            .map(|x| x.0)
            .collect();
        Ok(Self(AttrArgs { items }))
    }
}

struct AttrItemParser(AttrItem);

impl Parse for AttrItemParser {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(Lit) {
            return Ok(Self(AttrItem::Lit(input.parse()?)));
        }

        let key: Ident = input.parse()?;

        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            let value = if input.peek(Lit) {
                AttrValue::Lit(input.parse()?)
            } else {
                AttrValue::Ident(input.parse()?)
            };
            return Ok(Self(AttrItem::KeyValue { key, value }));
        }

        Ok(Self(AttrItem::Flag(key)))
    }
}
