//! `#[derive(Context)]`: one `FromRef` impl per field.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::fields::{shape, Shape};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Shape::Named(fields) = shape(input, "Context", false)? else {
        return Ok(TokenStream::new());
    };

    let ctx = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let impls = fields.iter().filter_map(|field| {
        let member = field.ident.as_ref()?;
        let ty = &field.ty;
        Some(quote! {
            impl #impl_generics crate::FromRef<#ctx #ty_generics> for #ty #where_clause {
                fn from_ref(ctx: &#ctx #ty_generics) -> Self {
                    ::std::clone::Clone::clone(&ctx.#member)
                }
            }
        })
    });

    Ok(quote! { #(#impls)* })
}
