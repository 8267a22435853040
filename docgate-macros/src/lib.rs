//! Procedural macros for the docgate project.
//!
//! `#[derive(Document)]` implements `docgate::document::Document` for a struct with
//! named fields, listing the field names exactly as serde writes them. The container's
//! `#[serde(rename_all = "...")]` and each field's `#[serde(rename = "...")]` and
//! `#[serde(skip)]` are honored; `#[serde(flatten)]` is rejected because the declared
//! field list could no longer be known at compile time.
//!
//! The system field names `id`, `createdAt` and `updatedAt` belong to the store and
//! cannot be declared as domain fields.

#[allow(unused_extern_crates)]
extern crate self as docgate_macros;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

#[proc_macro_derive(Document)]
pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Document can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Document can only be derived for structs",
            ));
        }
    };

    let container = SerdeAttrs::parse(&input.attrs)?;
    let rule = container
        .rename_all
        .as_ref()
        .map(|lit| RenameRule::parse(lit))
        .transpose()?
        .unwrap_or(RenameRule::None);

    let mut names = Vec::new();
    for field in fields {
        let attrs = SerdeAttrs::parse(&field.attrs)?;

        if attrs.flatten {
            return Err(syn::Error::new(
                field.span(),
                "Document cannot be derived for structs with #[serde(flatten)] fields",
            ));
        }
        if attrs.skip {
            continue;
        }

        let name = match attrs.rename {
            Some(rename) => rename.value(),
            None => {
                let ident = field
                    .ident
                    .as_ref()
                    .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?
                    .to_string();
                rule.apply(ident.trim_start_matches("r#"))
            }
        };
        if SYSTEM_FIELDS.contains(&name.as_str()) {
            return Err(syn::Error::new(
                field.span(),
                format!("`{name}` is a system field and cannot be declared on a Document"),
            ));
        }
        names.push(name);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::docgate::document::Document for #ident #ty_generics #where_clause {
            fn fields() -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    })
}

#[derive(Default)]
struct SerdeAttrs {
    rename_all: Option<LitStr>,
    rename: Option<LitStr>,
    skip: bool,
    flatten: bool,
}

impl SerdeAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut parsed = SerdeAttrs::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") && meta.input.peek(syn::Token![=]) {
                    parsed.rename_all = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                    parsed.rename = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("flatten") {
                    parsed.flatten = true;
                } else if meta.input.peek(syn::Token![=]) {
                    meta.value()?.parse::<syn::Expr>()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    content.parse::<proc_macro2::TokenStream>()?;
                }

                Ok(())
            })?;
        }

        Ok(parsed)
    }
}

enum RenameRule {
    None,
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unknown rename rule `{other}`"),
                ));
            }
        })
    }

    /// Applies the rule to a snake_case field name, the way serde does.
    fn apply(&self, field: &str) -> String {
        match self {
            RenameRule::None | RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => pascal(field),
            RenameRule::Camel => {
                let pascal = pascal(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
        }
    }
}

fn pascal(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut capitalize = true;

    for ch in field.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            out.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            out.push(ch);
        }
    }

    out
}
