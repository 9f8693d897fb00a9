//! `#[derive(FromContext)]`: resolve every field from the context.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, Type};

use crate::fields::{shape, Shape};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let ctx = context_type(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match shape(input, "FromContext", true)? {
        Shape::Unit => quote! { Self },
        Shape::Named(fields) => {
            let inits = fields.iter().filter_map(|field| {
                let member = field.ident.as_ref()?;
                let ty = &field.ty;
                Some(quote! { #member: <#ty as crate::FromRef<#ctx>>::from_ref(ctx) })
            });
            quote! { Self { #(#inits),* } }
        }
    };

    Ok(quote! {
        impl #impl_generics crate::FromRef<#ctx> for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn from_ref(ctx: &#ctx) -> Self {
                #body
            }
        }
    })
}

/// Context type from `#[from_context(Context = Type)]` (or a string literal),
/// falling back to `Context` in scope.
fn context_type(input: &DeriveInput) -> syn::Result<Type> {
    let mut found = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("from_context")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("Context") {
                return Err(meta.error("expected `Context = <type>`"));
            }
            let value = meta.value()?;
            found = Some(if value.peek(LitStr) {
                value.parse::<LitStr>()?.parse()?
            } else {
                value.parse()?
            });
            Ok(())
        })?;
    }

    Ok(found.unwrap_or_else(|| syn::parse_quote!(Context)))
}
