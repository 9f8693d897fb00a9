//! cm3588-mcp - Operations assistant for a CM3588 NAS
//!
//! A semantic knowledge base and changelog kept in a vector index, plus
//! remote control of the device over SSH, served to AI assistants via MCP.

pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod embedding;
pub mod error;
pub mod index;
pub mod mcp;
pub mod models;
pub mod remote;
pub mod repositories;
pub mod seed;
pub mod services;
pub mod store;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;
