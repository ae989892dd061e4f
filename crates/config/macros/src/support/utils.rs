use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields};

/// Return named fields if the input is a struct with them; otherwise error.
pub fn require_named_fields(input: &DeriveInput) -> syn::Result<&syn::FieldsNamed> {
    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Configurable can only be derived for structs",
            ));
        }
    };

    match fields {
        Fields::Named(n) => Ok(n),
        Fields::Unnamed(_) => Err(syn::Error::new(
            fields.span(),
            "Configurable requires a struct with named fields (e.g. `struct X { ... }`)",
        )),
        Fields::Unit => Err(syn::Error::new(
            input.ident.span(),
            "Configurable requires a struct with fields",
        )),
    }
}
