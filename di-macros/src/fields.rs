//! Struct shape checks shared by both derives.

use syn::{punctuated::Punctuated, token::Comma, Data, DeriveInput, Field, Fields};

/// Fields of the derive input as seen by the DI derives.
pub enum Shape<'a> {
    Named(&'a Punctuated<Field, Comma>),
    Unit,
}

/// Accepts structs with named fields, plus unit structs when `allow_unit`.
pub fn shape<'a>(input: &'a DeriveInput, derive: &str, allow_unit: bool) -> syn::Result<Shape<'a>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("{} can only be derived for structs", derive),
        ));
    };

    match &data.fields {
        Fields::Named(named) => Ok(Shape::Named(&named.named)),
        Fields::Unit if allow_unit => Ok(Shape::Unit),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("{} can only be derived for structs with named fields", derive),
        )),
    }
}
