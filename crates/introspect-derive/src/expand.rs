//! `ToValue` impl generation for `#[derive(Inspect)]`.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{GenericParam, Generics, Ident, LitStr, Path};

use crate::attrs::{InspectAttrs, InspectField};

pub(crate) fn generate_to_value(attrs: &InspectAttrs, core: &Path) -> syn::Result<TokenStream> {
    let ident = &attrs.ident;
    let generics = with_to_value_bounds(&attrs.generics, core);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let class = LitStr::new(&attrs.class_name(), Span::call_site());
    let parents = attrs
        .parent
        .iter()
        .map(|parent| LitStr::new(parent, Span::call_site()));
    let fields = attrs
        .fields()
        .iter()
        .filter(|field| !field.skip)
        .map(|field| generate_field(field, core))
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics #core::ToValue for #ident #ty_generics #where_clause {
            fn to_value(&self) -> #core::Value {
                #core::Value::record(
                    #core::Record::new(#class)
                        #(.with_parent(#parents))*
                        #(#fields)*
                )
            }
        }
    })
}

fn generate_field(field: &InspectField, core: &Path) -> syn::Result<TokenStream> {
    let Some(member) = &field.ident else {
        return Err(syn::Error::new(
            Span::call_site(),
            "`#[derive(Inspect)]` only supports named fields",
        ));
    };
    let name = LitStr::new(&field.record_name(), member.span());
    let visibility = visibility_variant(field.visibility());

    Ok(quote! {
        .with_field(
            #name,
            #core::Visibility::#visibility,
            #core::ToValue::to_value(&self.#member),
        )
    })
}

fn visibility_variant(visibility: &str) -> Ident {
    let variant = match visibility {
        "protected" => "Protected",
        "private" => "Private",
        "virtual" => "Virtual",
        _ => "Public",
    };
    Ident::new(variant, Span::call_site())
}

fn with_to_value_bounds(generics: &Generics, core: &Path) -> Generics {
    let mut generics = generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(param) = param {
            param.bounds.push(syn::parse_quote!(#core::ToValue));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use super::*;
    use darling::FromDeriveInput;
    use syn::parse_quote;

    fn expand(input: syn::DeriveInput) -> String {
        let attrs = InspectAttrs::from_derive_input(&input).unwrap();
        generate_to_value(&attrs, &parse_quote!(::introspect_core))
            .unwrap()
            .to_string()
    }

    #[test]
    fn builds_record_with_parents_and_visibilities() {
        let tokens = expand(parse_quote! {
            #[inspect(parent = "Base")]
            struct Account {
                pub owner: String,
                #[inspect(rename = "pin_code")]
                pin: u16,
                #[inspect(skip)]
                pub scratch: Vec<u8>,
            }
        });

        assert!(tokens.contains("Record :: new (\"Account\")"), "{tokens}");
        assert!(tokens.contains(". with_parent (\"Base\")"), "{tokens}");
        assert!(tokens.contains("Visibility :: Public"), "{tokens}");
        assert!(tokens.contains("\"pin_code\" , :: introspect_core :: Visibility :: Private"));
        assert!(!tokens.contains("scratch"));
    }

    #[test]
    fn type_parameters_gain_to_value_bound() {
        let tokens = expand(parse_quote! {
            struct Wrapper<T> {
                pub inner: T,
            }
        });

        assert!(
            tokens.contains("impl < T : :: introspect_core :: ToValue >"),
            "{tokens}"
        );
    }
}
