//! Derive macro exposing struct fields and their SQL annotations to sqltag.
//!
//! `#[derive(Model)]` implements `sqltag_core::Model` for a struct with
//! named fields. Each field contributes its name, its Rust type and the
//! annotation given by `#[sql("...")]`; fields without the attribute have no
//! column.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, LitStr};

/// Derives `sqltag_core::Model` for a struct.
///
/// # Attributes
///
/// - `#[model(name = "Entity")]` - Overrides the entity name (optional,
///   defaults to the struct name)
///
/// # Field Attributes
///
/// - `#[sql("PRIMARY KEY AUTOINCREMENT")]` - The constraint annotation of
///   the field. `#[sql("-")]` or no attribute at all leaves the field
///   without a column.
///
/// # Example
///
/// ```ignore
/// #[derive(Model)]
/// struct Product {
///     #[sql("PRIMARY KEY AUTOINCREMENT")]
///     id: i64,
///     #[sql("NOT NULL CHECK(length(name) > 0)")]
///     name: String,
///     cached_total: f64,
/// }
/// ```
#[proc_macro_derive(Model, attributes(model, sql))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_model_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_model_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let model_name = get_model_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Model derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Model derive only supports structs",
            ));
        }
    };

    let mut descriptors: Vec<TokenStream2> = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let field_name = ident.unraw().to_string();
        let field_type = &field.ty;
        let declared_type = quote!(#field_type).to_string().replace(' ', "");
        let annotation = get_annotation(&field.attrs)?.unwrap_or_default();

        descriptors.push(quote! {
            .field(#field_name, #declared_type, #annotation)
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::sqltag_core::Model for #struct_name #ty_generics #where_clause {
            fn descriptor() -> ::sqltag_core::ModelDescriptor {
                ::sqltag_core::ModelDescriptor::new(#model_name)
                    #(#descriptors)*
            }
        }
    })
}

fn get_model_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("model") {
            let mut model_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: Expr = meta.value()?.parse()?;
                    match value {
                        Expr::Lit(syn::ExprLit {
                            lit: Lit::Str(s), ..
                        }) => model_name = Some(s.value()),
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "expected a string literal",
                            ));
                        }
                    }
                    Ok(())
                } else {
                    Err(meta.error("unsupported model attribute"))
                }
            })?;
            if let Some(name) = model_name {
                return Ok(name);
            }
        }
    }
    Ok(struct_name.unraw().to_string())
}

fn get_annotation(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut annotation: Option<String> = None;
    for attr in attrs {
        if attr.path().is_ident("sql") {
            if annotation.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate sql attribute"));
            }
            let lit: LitStr = attr.parse_args()?;
            annotation = Some(lit.value());
        }
    }
    Ok(annotation)
}
