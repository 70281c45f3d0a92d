//! `#[derive(Inspect)]` for `introspect-core`.
//!
//! The derive implements `ToValue` for a struct with named fields, turning it
//! into a record whose class is the struct name. Field visibility follows the
//! Rust field: `pub` is public, `pub(crate)`/`pub(super)` is protected and a
//! private field is private.
//!
//! # Attributes
//!
//! - `#[inspect(class = "...")]` overrides the record class.
//! - `#[inspect(parent = "...")]` adds an ancestor class (repeatable).
//! - `#[inspect(rename = "...")]` renames a field.
//! - `#[inspect(visibility = "...")]` forces `public`, `protected`,
//!   `private` or `virtual`.
//! - `#[inspect(skip)]` leaves a field out.
//!
//! ```ignore
//! #[derive(Inspect)]
//! #[inspect(parent = "Entity")]
//! pub struct User {
//!     pub name: String,
//!     pub(crate) email: String,
//!     password_hash: String,
//! }
//! ```

use darling::FromDeriveInput;
use proc_macro::TokenStream;
use syn::parse_macro_input;

mod attrs;
mod expand;
mod runtime_path;

#[proc_macro_derive(Inspect, attributes(inspect))]
pub fn derive_inspect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);

    match expand_derive_inspect(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_derive_inspect(input: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = attrs::InspectAttrs::from_derive_input(input)
        .map_err(|err| syn::Error::new_spanned(input, err.to_string()))?;

    let errors = attrs.validate();
    if !errors.is_empty() {
        return Err(syn::Error::new_spanned(input, errors.join("; ")));
    }

    let core = runtime_path::resolve_core_path()?;
    expand::generate_to_value(&attrs, &core)
}
