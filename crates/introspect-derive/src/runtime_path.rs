use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::Span;

/// Path to `introspect-core` as seen from the crate expanding the derive.
pub(crate) fn resolve_core_path() -> syn::Result<syn::Path> {
    match crate_name("introspect-core") {
        // Inside introspect-core itself `crate` would break for its doctests
        // and integration tests; the crate aliases itself instead.
        Ok(FoundCrate::Itself) => Ok(syn::parse_quote!(::introspect_core)),
        Ok(FoundCrate::Name(name)) => {
            let ident = syn::Ident::new(&name.replace('-', "_"), Span::call_site());
            Ok(syn::parse_quote!(::#ident))
        }
        Err(_) => Err(syn::Error::new(
            Span::call_site(),
            "`#[derive(Inspect)]` needs `introspect-core` as a dependency",
        )),
    }
}
