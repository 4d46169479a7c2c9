//! MCP (Model Context Protocol) server for Sentry.
//!
//! Exposes issue search and issue reading as tools, and the organization's
//! project list as a resource, over JSON-RPC on stdio.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use handlers::ToolHandler;
pub use server::McpServer;
pub use transport::StdioTransport;
