use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{DeriveInput, Ident, Lit, LitStr, parse_macro_input};

use crate::support::attrs::{self, AttrItem};
use crate::support::{diag, utils};

/// How one struct field takes part in the walk
enum Role {
    /// `#[config("key...")]`
    Tagged {
        tag: LitStr,
        backend: Option<LitStr>,
    },
    /// No attribute: nested structure or plain value
    Node,
    /// `#[config(skip)]` or `#[config("-")]`
    Skipped,
}

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(ts) => ts.into(),
        Err(e) => diag::to_compile_error(e),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = utils::require_named_fields(input)?;

    let mut errors = Vec::new();
    let mut bindings = Vec::new();
    let mut visits = Vec::new();

    for (index, field) in fields.named.iter().enumerate() {
        let Some(ident) = &field.ident else {
            continue;
        };

        let role = match field_role(field) {
            Ok(role) => role,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        let binding = format_ident!("__field{}", index);
        let name = ident.unraw().to_string();

        let visit = match role {
            Role::Skipped => continue,
            Role::Tagged { tag, backend } => {
                let backend = match backend {
                    Some(backend) => quote!(::core::option::Option::Some(#backend)),
                    None => quote!(::core::option::Option::None),
                };
                quote! {
                    __walker.field(#name, #tag, #backend, #binding)?;
                }
            }
            Role::Node => quote! {
                __walker.node(#name, #binding)?;
            },
        };

        bindings.push(quote!(#ident: #binding));
        visits.push(visit);
    }

    if let Some(error) = diag::combine(errors) {
        return Err(error);
    }

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::stratum_config::Configurable for #struct_name #ty_generics #where_clause {
            fn walk<'__a>(
                &'__a mut self,
                __walker: &mut ::stratum_config::Walker<'__a>,
            ) -> ::core::result::Result<(), ::stratum_config::DefinitionError> {
                let Self { #(#bindings,)* .. } = self;
                #(#visits)*
                ::core::result::Result::Ok(())
            }
        }

        #[automatically_derived]
        impl #impl_generics ::stratum_config::Node for #struct_name #ty_generics #where_clause {
            fn visit<'__a>(
                &'__a mut self,
                __walker: &mut ::stratum_config::Walker<'__a>,
            ) -> ::core::result::Result<(), ::stratum_config::DefinitionError> {
                ::stratum_config::Configurable::walk(self, __walker)
            }
        }
    })
}

/// Read the `#[config(...)]` attributes of one field.
fn field_role(field: &syn::Field) -> syn::Result<Role> {
    let Some(args) = attrs::parse_attrs(&field.attrs, "config")? else {
        return Ok(Role::Node);
    };

    let mut tag: Option<LitStr> = None;
    let mut backend: Option<LitStr> = None;
    let mut skip = None;

    for item in &args.items {
        match item {
            AttrItem::Lit(Lit::Str(lit)) => {
                if tag.is_some() {
                    return Err(diag::error_spanned(lit, "duplicate configuration tag"));
                }
                tag = Some(lit.clone());
            }
            AttrItem::Lit(other) => {
                return Err(diag::error_spanned(
                    other,
                    "configuration tag must be a string literal, e.g. #[config(\"port\")]",
                ));
            }
            AttrItem::Flag(flag) if flag == "skip" => {
                if skip.is_some() {
                    return Err(diag::error_spanned(flag, "duplicate `skip`"));
                }
                skip = Some(flag.clone());
            }
            AttrItem::KeyValue { key, value } if key == "backend" => {
                if backend.is_some() {
                    return Err(diag::error_spanned(key, "duplicate `backend`"));
                }
                let name = value.require_str(key)?;
                if name.value().is_empty() {
                    return Err(diag::error_spanned(name, "backend name must not be empty"));
                }
                backend = Some(name.clone());
            }
            AttrItem::Flag(key) | AttrItem::KeyValue { key, .. } => {
                return Err(diag::error_spanned(
                    key,
                    format!("unknown config attribute `{key}`; expected a tag, `backend` or `skip`"),
                ));
            }
        }
    }

    if let Some(skip) = skip {
        return if tag.is_some() || backend.is_some() {
            Err(diag::error_spanned(
                &skip,
                "`skip` cannot be combined with a tag or `backend`",
            ))
        } else {
            Ok(Role::Skipped)
        };
    }

    match tag {
        Some(tag) if tag.value().trim() == "-" => {
            if let Some(backend) = backend {
                return Err(diag::error_spanned(
                    &backend,
                    "an ignored field cannot select a backend",
                ));
            }
            Ok(Role::Skipped)
        }
        Some(tag) => Ok(Role::Tagged { tag, backend }),
        None => {
            let span = backend
                .as_ref()
                .map(|lit| lit.span())
                .or_else(|| field.ident.as_ref().map(Ident::span))
                .unwrap_or_else(proc_macro2::Span::call_site);
            Err(syn::Error::new(
                span,
                "`backend` requires a configuration tag, e.g. #[config(\"key\", backend = \"env\")]",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(field: syn::Field) -> syn::Result<Role> {
        field_role(&field)
    }

    #[test]
    fn test_untagged_field_is_a_node() {
        assert!(matches!(role(syn::parse_quote!(db: Database)), Ok(Role::Node)));
    }

    #[test]
    fn test_tag_and_backend() {
        let parsed = role(syn::parse_quote! {
            #[config("port,required", backend = "env")]
            port: u16
        });
        match parsed {
            Ok(Role::Tagged { tag, backend }) => {
                assert_eq!(tag.value(), "port,required");
                assert_eq!(backend.map(|b| b.value()).as_deref(), Some("env"));
            }
            _ => panic!("expected a tagged field"),
        }
    }

    #[test]
    fn test_skip_forms() {
        assert!(matches!(
            role(syn::parse_quote!(#[config(skip)] cache: Cache)),
            Ok(Role::Skipped)
        ));
        assert!(matches!(
            role(syn::parse_quote!(#[config("-")] cache: Cache)),
            Ok(Role::Skipped)
        ));
    }

    #[test]
    fn test_rejected_attributes() {
        let cases: Vec<syn::Field> = vec![
            syn::parse_quote!(#[config(backend = "env")] port: u16),
            syn::parse_quote!(#[config("a", "b")] port: u16),
            syn::parse_quote!(#[config(42)] port: u16),
            syn::parse_quote!(#[config("port", default = "1")] port: u16),
            syn::parse_quote!(#[config("port", skip)] port: u16),
            syn::parse_quote!(#[config("port", backend = "")] port: u16),
            syn::parse_quote!(#[config("port", backend = "a", backend = "b")] port: u16),
            syn::parse_quote!(#[config] port: u16),
        ];

        for field in cases {
            assert!(field_role(&field).is_err(), "accepted {:?}", field.attrs);
        }
    }

    #[test]
    fn test_expansion_binds_tagged_and_nested_fields() {
        let input: DeriveInput = syn::parse_quote! {
            struct App {
                #[config("name")]
                name: String,
                database: Database,
                #[config(skip)]
                runtime: Runtime,
            }
        };

        let expanded = expand(&input).unwrap().to_string();
        assert!(expanded.contains("__walker . field (\"name\""));
        assert!(expanded.contains("__walker . node (\"database\""));
        assert!(!expanded.contains("runtime :"));
    }

    #[test]
    fn test_tuple_struct_is_rejected() {
        let input: DeriveInput = syn::parse_quote!(struct Port(u16););
        assert!(expand(&input).is_err());
    }
}
