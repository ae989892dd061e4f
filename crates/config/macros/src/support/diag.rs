use proc_macro::TokenStream;

/// Convert `syn::Error` into a TokenStream that emits a compiler error.
pub fn to_compile_error(err: syn::Error) -> TokenStream {
    err.to_compile_error().into()
}

/// Create a new `syn::Error` with the given span and message.
pub fn error_spanned<T: quote::ToTokens>(tokens: &T, msg: impl Into<String>) -> syn::Error {
    syn::Error::new_spanned(tokens, msg.into())
}

/// Combine several errors so they are all reported at once.
pub fn combine(errors: Vec<syn::Error>) -> Option<syn::Error> {
    errors.into_iter().reduce(|mut all, next| {
        all.combine(next);
        all
    })
}
