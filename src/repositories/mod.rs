//! Data access layer over the store.
//!
//! Repositories turn records into points and back, using the `FromContext`
//! derive macro for dependency injection.

mod changelog;
mod knowledge;

pub use changelog::ChangelogRepository;
pub use knowledge::KnowledgeRepository;
