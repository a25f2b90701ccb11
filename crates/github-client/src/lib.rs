//! GitHub REST API transport for the Unrelated GitHub MCP server.
//!
//! This crate owns the outbound side:
//! - [`client::GitHubClient`]: lazily created, reusable HTTP connection with auth headers and
//!   failure classification
//! - [`error::ClientError`]: the error taxonomy every call resolves into
//! - [`content`]: base64 content helpers for the contents API
//! - [`path::ApiPath`]: endpoint paths assembled segment by segment, so caller-supplied names
//!   are escaped and cannot climb out of the repository they name
//! - [`models`]: lenient response shapes (every field optional) for the endpoints the server exposes
//!
//! It intentionally contains **no** access policy; callers decide which owner/repo a call may
//! target before reaching this crate.

pub mod api;
pub mod client;
pub mod content;
pub mod error;
pub mod models;
pub mod path;

pub use client::GitHubClient;
pub use error::{ClientError, Result};
pub use path::ApiPath;
