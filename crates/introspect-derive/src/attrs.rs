//! `#[inspect(...)]` attribute parsing.

use darling::{FromDeriveInput, FromField};
use syn::Ident;

const VISIBILITIES: [&str; 4] = ["public", "protected", "private", "virtual"];

/// Container attributes of `#[derive(Inspect)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(inspect), supports(struct_named))]
pub struct InspectAttrs {
    pub ident: Ident,
    pub generics: syn::Generics,
    pub data: darling::ast::Data<(), InspectField>,

    /// Record class name; defaults to the struct name.
    #[darling(default)]
    pub class: Option<String>,

    /// Ancestor classes, nearest first. Repeatable.
    #[darling(default, multiple)]
    pub parent: Vec<String>,
}

/// Field attributes of `#[derive(Inspect)]`.
#[derive(Debug, Clone, FromField)]
#[darling(attributes(inspect))]
pub struct InspectField {
    pub ident: Option<Ident>,
    pub vis: syn::Visibility,

    /// Field name in the record; defaults to the Rust field name.
    #[darling(default)]
    pub rename: Option<String>,

    /// Leave the field out of the record.
    #[darling(default)]
    pub skip: bool,

    /// Overrides the visibility derived from the Rust field's `pub`.
    #[darling(default)]
    pub visibility: Option<String>,
}

impl InspectAttrs {
    pub fn class_name(&self) -> String {
        self.class.clone().unwrap_or_else(|| self.ident.to_string())
    }

    pub fn fields(&self) -> &[InspectField] {
        match &self.data {
            darling::ast::Data::Struct(fields) => &fields.fields,
            darling::ast::Data::Enum(_) => &[],
        }
    }

    /// Every problem found, so they can be reported together.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.class.as_deref() == Some("") {
            errors.push(format!("`{}`: class must not be empty", self.ident));
        }
        if self.parent.iter().any(String::is_empty) {
            errors.push(format!("`{}`: parent must not be empty", self.ident));
        }

        let mut seen = Vec::new();
        for field in self.fields().iter().filter(|field| !field.skip) {
            if let Err(err) = field.validate() {
                errors.push(err);
            }
            let name = field.record_name();
            if seen.contains(&name) {
                errors.push(format!("`{}`: field `{name}` appears twice", self.ident));
            } else {
                seen.push(name);
            }
        }

        errors
    }
}

impl InspectField {
    fn rust_name(&self) -> String {
        self.ident
            .as_ref()
            .map(Ident::to_string)
            .unwrap_or_default()
    }

    /// Name the field gets in the record.
    pub fn record_name(&self) -> String {
        self.rename.clone().unwrap_or_else(|| self.rust_name())
    }

    /// One of `public`, `protected`, `private` or `virtual`.
    pub fn visibility(&self) -> &str {
        if let Some(explicit) = &self.visibility {
            return explicit;
        }
        match self.vis {
            syn::Visibility::Public(_) => "public",
            syn::Visibility::Restricted(_) => "protected",
            syn::Visibility::Inherited => "private",
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.rename.as_deref() == Some("") {
            return Err(format!("field `{}`: rename must not be empty", self.rust_name()));
        }
        match &self.visibility {
            Some(visibility) if !VISIBILITIES.contains(&visibility.as_str()) => Err(format!(
                "field `{}`: unknown visibility `{visibility}`, expected one of {}",
                self.rust_name(),
                VISIBILITIES.join(", ")
            )),
            _ => Ok(()),
        }
    }
}
