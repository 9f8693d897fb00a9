//! Model Context Protocol (MCP) server for the CM3588 assistant.
//!
//! ## Architecture
//!
//! The server uses compile-time dependency injection via the `Context` struct.
//! Repositories and services are resolved at tool execution time using `FromRef`.
//!
//! ## Modules
//!
//! - `server`: MCP server implementation with tool router, resources and prompts
//! - `tools`: Tool implementations organized by domain
//! - `resources`: Static docs and live device views
//! - `prompts`: Task templates
//! - `protocol`: Response formatting (JSON or TOON)

pub mod prompts;
pub(crate) mod protocol;
pub mod resources;
pub(crate) mod server;
mod tools;

pub use server::McpServer;
