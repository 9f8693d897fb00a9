//! Backend implementations of [`VectorIndex`](crate::index::VectorIndex).
//!
//! # Available Backends
//!
//! | Backend | Module | Use |
//! |---------|--------|-----|
//! | Qdrant (REST) | [`qdrant`] | Production |
//! | In-process | [`memory`] | Tests, offline runs |
//!
//! # Implementing a Backend
//!
//! 1. Create a struct holding the connection (e.g., `QdrantIndex`)
//! 2. Implement `VectorIndex` for it
//! 3. Map "cannot reach the service" to `AppError::IndexUnavailable`
//! 4. Add a variant to `IndexBackend` and a branch in `index::connect`

pub mod memory;
pub mod qdrant;
