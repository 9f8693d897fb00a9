//! Dependency injection by type.
//!
//! The store handle, the remote executor and the configuration all live on
//! [`crate::context::Context`]. Repositories and services list the pieces
//! they need as fields and are assembled from the context on demand, so a
//! test context built around a memory index and a scripted executor flows
//! through the same code as production.
//!
//! ```ignore
//! #[derive(FromContext, Clone)]
//! pub struct ChangelogRepository {
//!     store: AppStore,
//! }
//!
//! let repo: ChangelogRepository = ctx.resolve();
//! ```

pub use di_macros::{Context, FromContext};

/// Builds `Self` out of a borrowed `T`.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

/// Method-call form of [`FromRef`] on the source side.
pub trait Resolve: Sized {
    fn resolve<D: FromRef<Self>>(&self) -> D {
        D::from_ref(self)
    }
}

impl<T> Resolve for T {}
