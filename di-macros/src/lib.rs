//! Compile-time dependency injection macros for cm3588-mcp.
//!
//! - `#[derive(Context)]` makes every field of the root context resolvable
//! - `#[derive(FromContext)]` builds a repository or service by resolving
//!   each of its fields from the context
//!
//! Generated code refers to `crate::FromRef`, so the consuming crate must
//! define (or re-export) that trait at its root.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod context;
mod fields;
mod from_context;

/// Derive macro for the root DI context.
///
/// Generates one `FromRef<Ctx>` impl per field, returning a clone of that
/// field. Field types must therefore be `Clone` and pairwise distinct.
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct Context {
///     pub config: Arc<Config>,
///     pub store: AppStore,
///     pub remote: AppRemote,
/// }
///
/// // impl FromRef<Context> for Arc<Config> { ... }
/// // impl FromRef<Context> for AppStore { ... }
/// // impl FromRef<Context> for AppRemote { ... }
/// ```
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive macro for types assembled from a context.
///
/// Each field is resolved with `FromRef::from_ref(ctx)`, so nested
/// repositories and services compose without manual wiring.
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct KnowledgeService {
///     knowledge: KnowledgeRepository, // itself FromContext
///     remote: AppRemote,              // a Context field
/// }
/// ```
///
/// The context type defaults to `Context` in scope and can be overridden with
/// either `#[from_context(Context = TestContext)]` or the string form
/// `#[from_context(Context = "crate::context::Context")]`.
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
