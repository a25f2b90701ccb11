//! GitHub MCP server.
//!
//! Exposes GitHub repositories, files, issues, pull requests, Actions and gists as MCP tools
//! over rmcp's streamable-HTTP transport. Every repository-scoped call goes through
//! [`policy::AccessPolicy`] (default/runtime target resolution plus an allow-list) before
//! reaching [`unrelated_github_client::GitHubClient`].

pub mod auth;
pub mod catalog;
pub mod config;
pub mod mcp;
pub mod policy;
pub mod state;

pub use config::Settings;
pub use mcp::router;
pub use state::AppState;
